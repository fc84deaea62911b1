//! Mood logging turns.

use vera_core::{extract, mood};

use crate::EngineError;
use crate::store::Store;

/// Log a mood from free text and respond with the score, the 7-day
/// context and a suggestion. The rolling average is read after the
/// insert, so the fresh entry counts toward it.
pub async fn handle(store: &Store, user_id: &str, input: &str) -> Result<String, EngineError> {
    let text = extract::mood_text(input);
    let reading = mood::assess(&text);

    store.record_mood(user_id, reading.label, reading.score).await?;
    store
        .log_interaction(
            user_id,
            "mood",
            "store",
            "mood_logging",
            &format!("Mood: {} (Score: {}/10)", reading.label, reading.score),
        )
        .await?;

    let rolling = store.mood_rolling_average(user_id, 7).await?;

    let mut message = format!(
        "Mood logged: **{}** (Score: {}/10)",
        reading.label, reading.score
    );
    if text.to_lowercase().trim() != reading.label {
        message.push_str(&format!("\nFrom: \"{}\"", text.trim()));
    }
    if let Some(avg) = rolling {
        message.push_str(&format!("\nYour 7-day average: {avg}/10"));
        let score = f64::from(reading.score);
        if score > avg + 1.0 {
            message.push_str("\nThat's higher than your recent average - great to see!");
        } else if score < avg - 1.0 {
            message.push_str("\nThat's lower than usual - remember to be kind to yourself.");
        }
    }
    message.push_str(&format!(
        "\n\n💡 **Suggestions:** {}",
        mood::recommendation(reading.score, rolling)
    ));

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed_user, test_store};

    #[tokio::test]
    async fn first_mood_entry_logs_and_averages_itself() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;

        let reply = handle(&store, "1042", "I'm feeling really great today!")
            .await
            .unwrap();
        assert!(reply.contains("Mood logged: **great** (Score: 8/10)"));
        assert!(reply.contains("From: \"really great today!\""));
        assert!(reply.contains("Your 7-day average: 8/10"));
        assert!(reply.contains("💡 **Suggestions:**"));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM mood_tracking WHERE user_id = '1042'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn high_mood_against_low_history_gets_the_upbeat_note() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        store.record_mood("1042", "sad", 2).await.unwrap();
        store.record_mood("1042", "sad", 2).await.unwrap();

        // (2 + 2 + 8) / 3 = 4, well below the fresh 8.
        let reply = handle(&store, "1042", "feeling great").await.unwrap();
        assert!(reply.contains("That's higher than your recent average - great to see!"));
    }

    #[tokio::test]
    async fn low_mood_against_high_history_gets_the_gentle_note() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        store.record_mood("1042", "great", 8).await.unwrap();
        store.record_mood("1042", "great", 8).await.unwrap();

        let reply = handle(&store, "1042", "I feel sad").await.unwrap();
        assert!(reply.contains("Mood logged: **sad** (Score: 3/10)"));
        assert!(reply.contains("That's lower than usual - remember to be kind to yourself."));
    }

    #[tokio::test]
    async fn bare_label_input_skips_the_from_line() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;

        let reply = handle(&store, "1042", "mood: okay").await.unwrap();
        assert!(reply.contains("Mood logged: **okay** (Score: 5/10)"));
        assert!(!reply.contains("From:"));
    }
}
