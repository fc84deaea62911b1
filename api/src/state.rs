use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use vera_core::session::Session;
use vera_engine::dispatch::Dispatcher;

/// Shared application state. Sessions live in memory keyed by
/// conversation id; a restart logs everyone out, which is acceptable
/// because logging in is a single message.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    sessions: Arc<Mutex<HashMap<String, Arc<Mutex<Session>>>>>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        AppState {
            dispatcher: Arc::new(dispatcher),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Handle to one conversation's session. The map lock is held only for
    /// the lookup; callers lock the returned handle for the duration of a
    /// turn, so a slow turn blocks its own conversation and nothing else.
    pub async fn session(&self, conversation_id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use vera_engine::backend::HttpBackend;
    use vera_engine::store::Store;

    async fn test_state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        let backend = Arc::new(HttpBackend::new("http://localhost:0"));
        AppState::new(Dispatcher::new(Store::new(pool), backend))
    }

    #[tokio::test]
    async fn conversations_lock_independently() {
        let state = test_state().await;
        let a = state.session("conv-a").await;
        let b = state.session("conv-b").await;

        let _held = a.lock().await;
        // A turn in one conversation does not park other conversations.
        assert!(b.try_lock().is_ok());
        // Turns within the same conversation still serialize.
        assert!(a.try_lock().is_err());
    }

    #[tokio::test]
    async fn session_handle_is_stable_per_conversation() {
        let state = test_state().await;
        let first = state.session("conv-a").await;
        let again = state.session("conv-a").await;
        assert!(Arc::ptr_eq(&first, &again));
    }
}
