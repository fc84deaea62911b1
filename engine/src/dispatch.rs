//! Turn dispatcher: session gating, built-in commands, intent routing.

use std::sync::Arc;

use vera_core::intent::{self, Intent};
use vera_core::session::{PriorContext, Session, SessionState};
use vera_core::turn::TurnOutcome;

use crate::EngineError;
use crate::backend::GenerativeBackend;
use crate::handlers;
use crate::store::Store;

const HELP_COMMANDS: &[&str] = &["help", "features", "what can you do", "options"];
const LOGOUT_COMMANDS: &[&str] = &["logout", "sign out", "exit"];

fn apology(err: &EngineError) -> String {
    format!("❌ Sorry, I encountered an error: {err}\n\nPlease try again or ask for help.")
}

/// Routes each turn to the matching handler. Holds the store and the
/// generative backend; sessions are owned by the delivery layer and
/// passed in per turn.
pub struct Dispatcher {
    store: Store,
    backend: Arc<dyn GenerativeBackend>,
}

impl Dispatcher {
    pub fn new(store: Store, backend: Arc<dyn GenerativeBackend>) -> Self {
        Dispatcher { store, backend }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Process one user turn. Handler failures never escape: they are
    /// logged and turned into an apology so the conversation continues.
    pub async fn process_turn(&self, session: &mut Session, input: &str) -> TurnOutcome {
        let input = input.trim();
        if input.is_empty() {
            return TurnOutcome::reply("Please enter a message!", session.state.clone());
        }

        if !session.is_authenticated() {
            return match handlers::login::resolve(&self.store, session, input).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::error!(%err, "login resolution failed");
                    TurnOutcome::reply(apology(&err), session.state.clone())
                }
            };
        }

        let lowered = input.to_lowercase();
        if HELP_COMMANDS.contains(&lowered.as_str()) {
            return TurnOutcome::reply(handlers::general::FEATURES, session.state.clone());
        }
        if LOGOUT_COMMANDS.contains(&lowered.as_str()) {
            let name = session.logout().unwrap_or_else(|| "friend".to_string());
            return TurnOutcome::reply(
                format!(
                    "👋 Goodbye, {name}! You've been successfully logged out.\n\n\
                     To log back in, just provide your User ID or name when you're ready."
                ),
                session.state.clone(),
            );
        }

        let SessionState::Authenticated { user_id, user_name } = session.state.clone() else {
            return TurnOutcome::reply("Please log in first.", session.state.clone());
        };

        let intent = intent::classify(input);
        tracing::debug!(%user_id, intent = intent.as_str(), "turn classified");

        let prior = session.prior_context.clone();
        let result = match intent {
            Intent::MoodTracking => handlers::mood::handle(&self.store, &user_id, input).await,
            Intent::CgmMonitoring => handlers::glucose::handle(&self.store, &user_id, input).await,
            Intent::FoodLogging => {
                handlers::food::handle(&self.store, self.backend.as_ref(), &user_id, input).await
            }
            Intent::MealPlanning => {
                let today = chrono::Utc::now().date_naive();
                handlers::plan::handle(&self.store, self.backend.as_ref(), &user_id, input, today)
                    .await
            }
            Intent::InsightsRequest => {
                handlers::insights::handle(&self.store, &user_id, input).await
            }
            _ => Ok(handlers::general::handle(Some(&user_name), input, prior.as_ref())),
        };

        match result {
            Ok(reply) => {
                // A general detour must not overwrite where the user left off.
                if intent != Intent::GeneralQuestion {
                    session.prior_context = Some(PriorContext {
                        summary: input.to_string(),
                        handler: intent.as_str().to_string(),
                    });
                }
                TurnOutcome::reply(reply, session.state.clone()).with_intent(intent)
            }
            Err(err) => {
                tracing::error!(%user_id, intent = intent.as_str(), %err, "handler failed");
                TurnOutcome::reply(apology(&err), session.state.clone())
            }
        }
    }
}
