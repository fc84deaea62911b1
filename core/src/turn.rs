//! Wire types for a single conversational turn.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::intent::Intent;
use crate::session::SessionState;

/// Everything a delivery surface needs to render one assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TurnOutcome {
    /// Assistant reply, ready to display.
    pub reply: String,
    /// Intent the turn resolved to, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Session state after the turn.
    pub session: SessionState,
    /// Set when a name search found exactly one candidate and the turn is
    /// waiting for the user to confirm login with this ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_user_id: Option<String>,
}

impl TurnOutcome {
    pub fn reply(text: impl Into<String>, session: SessionState) -> Self {
        TurnOutcome {
            reply: text.into(),
            intent: None,
            session,
            suggested_user_id: None,
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_suggested_user(mut self, user_id: impl Into<String>) -> Self {
        self.suggested_user_id = Some(user_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_without_empty_fields() {
        let outcome = TurnOutcome::reply("hello", SessionState::Unauthenticated);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["reply"], "hello");
        assert_eq!(json["session"]["state"], "unauthenticated");
        assert!(json.get("intent").is_none());
        assert!(json.get("suggested_user_id").is_none());
    }

    #[test]
    fn outcome_carries_intent_and_suggestion() {
        let outcome = TurnOutcome::reply(
            "Did you mean Ananya Pillai (1042)?",
            SessionState::Unauthenticated,
        )
        .with_intent(Intent::NameSearch)
        .with_suggested_user("1042");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["intent"], "name_search");
        assert_eq!(json["suggested_user_id"], "1042");
    }
}
