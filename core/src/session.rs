use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-conversation authentication state. Strictly binary: a session is
/// either anonymous or bound to exactly one validated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticated { user_id: String, user_name: String },
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated { .. } => "authenticated",
        }
    }
}

/// What the user was doing before an interruption, so a general-question
/// reply can route them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorContext {
    pub summary: String,
    pub handler: String,
}

/// Session value threaded explicitly through each turn. Owned by the
/// delivery layer (one live session per conversation); never shared
/// between conversations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub state: SessionState,
    pub prior_context: Option<PriorContext>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            state: SessionState::Unauthenticated,
            prior_context: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated { user_id, .. } => Some(user_id),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn user_name(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated { user_name, .. } => Some(user_name),
            SessionState::Unauthenticated => None,
        }
    }

    /// Transition to Authenticated. The caller must have validated the id
    /// against storage first; the session itself never talks to the store.
    pub fn authenticate(&mut self, user_id: impl Into<String>, user_name: impl Into<String>) {
        self.state = SessionState::Authenticated {
            user_id: user_id.into(),
            user_name: user_name.into(),
        };
    }

    /// Transition back to Unauthenticated, clearing everything tied to the
    /// user. Returns the name that was logged out, for the goodbye message.
    pub fn logout(&mut self) -> Option<String> {
        let name = self.user_name().map(String::from);
        self.state = SessionState::Unauthenticated;
        self.prior_context = None;
        name
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
