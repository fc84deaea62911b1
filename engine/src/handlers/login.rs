//! Unauthenticated turn resolution: ID validation and name lookup.

use vera_core::auth;
use vera_core::extract;
use vera_core::intent::Intent;
use vera_core::session::Session;
use vera_core::turn::TurnOutcome;

use crate::EngineError;
use crate::store::{Store, UserMatch};

const LOGIN_HELP: &str = "👋 **Welcome to your Personal Health Assistant!**\n\n\
To get started, I need to verify your identity:\n\n\
**🔐 Login Options:**\n\
1. **Enter your User ID** - If you know your unique user ID\n\
2. **Tell me your name** - Say \"My name is [Your Name]\" and I'll help find your ID\n\n\
**💡 Example:**\n\
• \"My name is John Smith\"\n\
• Or paste your User ID directly\n\n\
How would you like to proceed?";

fn welcome_message(name: &str, city: &str) -> String {
    format!(
        "🎉 **Welcome back, {name} from {city}!**\n\n\
         I'm your personal health assistant. Here's what I can help you with today:\n\n\
         **🏥 Quick Actions:**\n\
         • **Track Mood** - \"I'm feeling great today!\"\n\
         • **Log Glucose** - \"My glucose reading is 120\"\n\
         • **Log Food** - \"I ate grilled chicken with vegetables\"\n\
         • **Plan Meals** - \"Generate a meal plan for tomorrow\"\n\
         • **Get Insights** - \"Show me my mood trends\"\n\n\
         **❓ Need Help?**\n\
         • Say \"help\" or \"what can you do?\" for more options\n\n\
         What would you like to do first?"
    )
}

/// Rank name matches by similarity to the query, best first. The LIKE
/// search is a coarse substring filter; Jaro-Winkler puts the closest
/// spelling on top.
fn rank_matches(query: &str, mut matches: Vec<UserMatch>) -> Vec<UserMatch> {
    let query = query.to_lowercase();
    matches.sort_by(|a, b| {
        let sa = strsim::jaro_winkler(&query, &a.name.to_lowercase());
        let sb = strsim::jaro_winkler(&query, &b.name.to_lowercase());
        sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
    });
    matches
}

/// Resolve one unauthenticated turn. Only a validated ID flips the
/// session to authenticated; a single name match produces a suggestion
/// that still requires the user to type the ID.
pub async fn resolve(
    store: &Store,
    session: &mut Session,
    input: &str,
) -> Result<TurnOutcome, EngineError> {
    if auth::looks_like_user_id(input) {
        let user_id = input.trim();
        return match store.user_by_id(user_id).await? {
            Some(profile) => {
                session.authenticate(&profile.user_id, &profile.name);
                tracing::info!(user_id = %profile.user_id, "user authenticated");
                Ok(
                    TurnOutcome::reply(welcome_message(&profile.name, &profile.city), session.state.clone())
                        .with_intent(Intent::Authentication),
                )
            }
            None => Ok(TurnOutcome::reply(
                "Invalid user ID. Please check your ID or tell me your name so I can help you find it.\n\n\
                 💡 **Can't find your ID?** Tell me your name and I'll help you find it!\n\
                 Example: 'My name is John Smith'",
                session.state.clone(),
            )
            .with_intent(Intent::Authentication)),
        };
    }

    if auth::looks_like_name_search(input) {
        let name = extract::name_candidate(input);
        let matches = rank_matches(&name, store.users_by_name(&name).await?);

        let outcome = match matches.as_slice() {
            [] => TurnOutcome::reply(
                format!(
                    "No users found matching '{name}'. Please try a different name or check the spelling.\n\n\
                     Try a different spelling or ask for help finding your account."
                ),
                session.state.clone(),
            ),
            [only] => TurnOutcome::reply(
                format!(
                    "✅ **Found a match!**\n\n\
                     **Name:** {}\n\
                     **Location:** {}\n\n\
                     Is this you? If yes, type your User ID to log in.",
                    only.name, only.city
                ),
                session.state.clone(),
            )
            .with_suggested_user(&only.user_id),
            many => {
                let listing = many
                    .iter()
                    .map(|u| format!("• **{}** ({}) - ID: `{}`", u.name, u.city, u.user_id))
                    .collect::<Vec<_>>()
                    .join("\n");
                TurnOutcome::reply(
                    format!(
                        "📋 **Found {} matches for '{name}':**\n\n{listing}\n\n\
                         Please copy and paste the correct User ID to log in.",
                        many.len()
                    ),
                    session.state.clone(),
                )
            }
        };
        return Ok(outcome.with_intent(Intent::NameSearch));
    }

    Ok(TurnOutcome::reply(LOGIN_HELP, session.state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed_user, test_store};
    use vera_core::session::SessionState;

    #[tokio::test]
    async fn valid_id_authenticates_the_session() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let mut session = Session::new();

        let outcome = resolve(&store, &mut session, "1042").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user_name(), Some("Ananya Pillai"));
        assert!(outcome.reply.contains("Welcome back, Ananya Pillai from Pune"));
        assert_eq!(outcome.intent, Some(Intent::Authentication));
    }

    #[tokio::test]
    async fn unknown_id_stays_unauthenticated() {
        let store = test_store().await;
        let mut session = Session::new();

        let outcome = resolve(&store, &mut session, "9999").await.unwrap();
        assert!(!session.is_authenticated());
        assert!(outcome.reply.contains("Invalid user ID"));
        assert_eq!(outcome.session, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn single_name_match_suggests_but_does_not_log_in() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let mut session = Session::new();

        let outcome = resolve(&store, &mut session, "My name is Ananya Pillai")
            .await
            .unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(outcome.suggested_user_id.as_deref(), Some("1042"));
        assert!(outcome.reply.contains("Found a match"));
    }

    #[tokio::test]
    async fn multiple_matches_list_ids_closest_first() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        seed_user(&store, "1043", "Ananya Rao", &[]).await;
        let mut session = Session::new();

        let outcome = resolve(&store, &mut session, "called Ananya Rao").await.unwrap();
        assert_eq!(outcome.suggested_user_id.as_deref(), Some("1043"));

        // A broader query returns both, ranked closest to the query first.
        let outcome = resolve(&store, &mut session, "My name is Ananya").await.unwrap();
        assert!(outcome.suggested_user_id.is_none());
        assert!(outcome.reply.contains("2 matches"));
        let rao = outcome.reply.find("Ananya Rao").unwrap();
        let pillai = outcome.reply.find("Ananya Pillai").unwrap();
        assert!(rao < pillai);
    }

    #[tokio::test]
    async fn unrecognized_input_gets_login_help() {
        let store = test_store().await;
        let mut session = Session::new();

        let outcome = resolve(&store, &mut session, "hello?").await.unwrap();
        assert!(outcome.reply.contains("Login Options"));
        assert!(outcome.intent.is_none());
    }
}
