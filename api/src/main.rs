use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vera_engine::backend::HttpBackend;
use vera_engine::dispatch::Dispatcher;
use vera_engine::store::Store;

mod error;
mod routes;
mod state;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vera Health API",
        version = "0.1.0",
        description = "Conversational health tracking: mood, glucose, food, meal planning and insights over a single turn endpoint."
    ),
    paths(routes::health::health_check, routes::turn::process_turn),
    components(schemas(
        HealthResponse,
        routes::turn::TurnRequest,
        vera_core::error::ApiError,
        vera_core::turn::TurnOutcome,
        vera_core::session::SessionState,
        vera_core::intent::Intent,
    ))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vera_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://vera.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let backend_url =
        std::env::var("VERA_BACKEND_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let mut backend = HttpBackend::new(backend_url);
    if let Ok(api_key) = std::env::var("VERA_BACKEND_API_KEY") {
        backend = backend.with_api_key(api_key);
    }
    let dispatcher = Dispatcher::new(Store::new(pool), Arc::new(backend));
    let app_state = state::AppState::new(dispatcher);

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::turn::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Vera API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
