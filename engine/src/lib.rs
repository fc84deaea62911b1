pub mod backend;
pub mod dispatch;
pub mod handlers;
pub mod store;

use thiserror::Error;

/// Failures a turn can hit below the conversation layer. The dispatcher
/// converts these into an apology reply rather than dropping the turn.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generative backend error: {0}")]
    Backend(#[from] backend::BackendError),
}
