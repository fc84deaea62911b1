use axum::extract::State;
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use utoipa::ToSchema;
use vera_core::turn::TurnOutcome;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/turn", post(process_turn))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TurnRequest {
    /// Client-chosen conversation key; each key owns one session.
    pub conversation_id: String,
    pub message: String,
}

/// Process one conversational turn
#[utoipa::path(
    post,
    path = "/v1/turn",
    request_body = TurnRequest,
    responses(
        (status = 200, description = "Turn processed", body = TurnOutcome),
        (status = 400, description = "Invalid request", body = vera_core::error::ApiError)
    ),
    tag = "conversation"
)]
pub async fn process_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let conversation_id = request.conversation_id.trim();
    if conversation_id.is_empty() {
        return Err(AppError::Validation {
            message: "conversation_id must not be empty".to_string(),
            field: Some("conversation_id".to_string()),
            received: Some(serde_json::Value::String(request.conversation_id.clone())),
            docs_hint: Some(
                "Pick any stable string per conversation, e.g. a UUID generated by the client."
                    .to_string(),
            ),
        });
    }

    // Only this conversation's lock is held across the turn, so two
    // requests on the same conversation cannot interleave session updates
    // while other conversations proceed unblocked.
    let session = state.session(conversation_id).await;
    let mut session = session.lock().await;
    let outcome = state
        .dispatcher
        .process_turn(&mut session, &request.message)
        .await;
    Ok(Json(outcome))
}
