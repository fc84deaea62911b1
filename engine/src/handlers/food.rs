//! Meal logging turns with nutrient estimation and feedback.

use vera_core::extract;

use crate::EngineError;
use crate::backend::{self, GenerativeBackend, Nutrients};
use crate::store::{NutritionSummary, Store, UserProfile};

fn meal_feedback(n: &Nutrients) -> &'static str {
    if n.protein > 25.0 {
        "Excellent protein content!"
    } else if n.protein > 15.0 {
        "Good protein source."
    } else if n.protein < 5.0 {
        "Consider adding more protein."
    } else if n.calories > 600.0 {
        "High-calorie meal - great for post-workout or busy days."
    } else if n.calories < 200.0 {
        "Light meal - consider if this meets your energy needs."
    } else if n.carbs > n.protein * 4.0 {
        "Carb-heavy meal - pair with protein if possible."
    } else {
        "Nutritious meal logged!"
    }
}

fn dietary_feedback(n: &Nutrients, profile: &UserProfile) -> Vec<&'static str> {
    let mut notes = Vec::new();
    let diabetic = profile.medical_conditions.iter().any(|c| {
        c == "Type 1 Diabetes" || c == "Type 2 Diabetes" || c == "Pre-diabetes"
    });
    if diabetic {
        if n.carbs > 45.0 {
            notes.push("High carb content - monitor blood glucose closely.");
        } else if n.carbs < 15.0 {
            notes.push("Low carb meal - good for glucose management.");
        }
    }
    if profile.medical_conditions.iter().any(|c| c == "Hypertension") {
        notes.push("Consider the sodium content if this meal includes processed foods.");
    }
    if profile.dietary_category == "Vegan" && n.protein < 10.0 {
        notes.push("As a vegan, ensure adequate plant-based protein sources.");
    } else if profile.dietary_category == "Vegetarian" && n.protein < 15.0 {
        notes.push("Consider adding more vegetarian protein sources.");
    }
    notes
}

fn context_feedback(n: &Nutrients, recent: &NutritionSummary) -> Vec<&'static str> {
    let mut notes = Vec::new();
    if recent.entries_count == 0 {
        return notes;
    }
    if recent.average_calories > 0.0 {
        if n.calories > recent.average_calories * 1.5 {
            notes.push("This is higher in calories than your recent meals.");
        } else if n.calories < recent.average_calories * 0.5 {
            notes.push("This is lower in calories than your recent meals.");
        }
    }
    if recent.average_protein > 0.0 {
        if n.protein > recent.average_protein * 1.3 {
            notes.push("Great protein boost compared to your recent intake!");
        } else if n.protein < recent.average_protein * 0.7 {
            notes.push("Consider adding protein to your next meal.");
        }
    }
    if recent.entries_count >= 3 {
        notes.push("You're maintaining good meal consistency.");
    }
    notes
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Log a meal: extract the description, estimate macros through the
/// backend, persist, and reply with the breakdown plus feedback tuned to
/// the user's conditions and recent intake.
pub async fn handle(
    store: &Store,
    backend: &dyn GenerativeBackend,
    user_id: &str,
    input: &str,
) -> Result<String, EngineError> {
    let meal = extract::meal_description(input);
    if meal.is_empty() {
        return Ok("Please provide a meal description to analyze.".to_string());
    }

    let nutrients = backend::analyze_nutrients(backend, &meal).await;
    store.record_meal(user_id, &meal, &nutrients).await?;
    store
        .log_interaction(
            user_id,
            "food",
            "store",
            "meal_logging",
            &format!(
                "Meal: {}... (Calories: {})",
                truncate_chars(&meal, 50),
                nutrients.calories
            ),
        )
        .await?;

    let mut message = format!(
        "✅ Meal logged successfully!\n\n\
         **Nutritional Breakdown:**\n\
         • Carbohydrates: {}g\n\
         • Protein: {}g\n\
         • Fat: {}g\n\
         • Calories: {} kcal\n\n\
         **Feedback:** {}",
        nutrients.carbs,
        nutrients.protein,
        nutrients.fat,
        nutrients.calories,
        meal_feedback(&nutrients)
    );

    if let Some(profile) = store.user_by_id(user_id).await? {
        let notes = dietary_feedback(&nutrients, &profile);
        if !notes.is_empty() {
            message.push_str(&format!("\n\n**Dietary Notes:** {}", notes.join(" ")));
        }
    }

    // The one-day window includes the meal just stored.
    let recent = store.nutrition_summary(user_id, 1).await?;
    let context = context_feedback(&nutrients, &recent);
    if !context.is_empty() {
        message.push_str(&format!("\n\n**Context:** {}", context.join(" ")));
    }

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use crate::store::{seed_user, seed_user_full, test_store};

    #[tokio::test]
    async fn meal_is_stored_with_backend_macros() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let backend = ScriptedBackend::new([
            r#"{"carbs": 40, "protein": 35, "fat": 12, "calories": 450}"#,
        ]);

        let reply = handle(&store, &backend, "1042", "I ate grilled chicken with rice")
            .await
            .unwrap();
        assert!(reply.contains("✅ Meal logged successfully!"));
        assert!(reply.contains("• Protein: 35g"));
        assert!(reply.contains("• Calories: 450 kcal"));
        assert!(reply.contains("**Feedback:** Excellent protein content!"));

        let desc: String =
            sqlx::query_scalar("SELECT meal_description FROM food_intake WHERE user_id = '1042'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(desc, "grilled chicken with rice");
    }

    #[tokio::test]
    async fn backend_failure_still_logs_with_fallback_estimate() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let backend = ScriptedBackend::failing();

        let reply = handle(&store, &backend, "1042", "just had a mystery snack")
            .await
            .unwrap();
        assert!(reply.contains("• Calories: 250 kcal"));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM food_intake WHERE user_id = '1042'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn diabetic_user_gets_carb_warning() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &["Type 2 Diabetes"]).await;
        let backend = ScriptedBackend::new([
            r#"{"carbs": 80, "protein": 10, "fat": 15, "calories": 520}"#,
        ]);

        let reply = handle(&store, &backend, "1042", "I had pasta with garlic bread")
            .await
            .unwrap();
        assert!(reply.contains("High carb content - monitor blood glucose closely."));
    }

    #[tokio::test]
    async fn vegan_low_protein_note() {
        let store = test_store().await;
        seed_user_full(&store, "1042", "Ananya Pillai", "Vegan", &[]).await;
        let backend = ScriptedBackend::new([
            r#"{"carbs": 50, "protein": 6, "fat": 8, "calories": 300}"#,
        ]);

        let reply = handle(&store, &backend, "1042", "I ate a fruit bowl").await.unwrap();
        assert!(reply.contains("As a vegan, ensure adequate plant-based protein sources."));
    }

    #[tokio::test]
    async fn context_compares_against_same_day_meals() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let light = Nutrients {
            carbs: 20.0,
            protein: 20.0,
            fat: 5.0,
            calories: 200.0,
        };
        store.record_meal("1042", "toast", &light).await.unwrap();
        store.record_meal("1042", "toast again", &light).await.unwrap();

        let backend = ScriptedBackend::new([
            r#"{"carbs": 60, "protein": 40, "fat": 30, "calories": 900}"#,
        ]);
        let reply = handle(&store, &backend, "1042", "I ate a giant burger and fries")
            .await
            .unwrap();
        // New meal is well above the day's running averages.
        assert!(reply.contains("This is higher in calories than your recent meals."));
        assert!(reply.contains("Great protein boost compared to your recent intake!"));
        assert!(reply.contains("You're maintaining good meal consistency."));
    }

    #[tokio::test]
    async fn empty_description_prompts_for_one() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let backend = ScriptedBackend::new([]);

        let reply = handle(&store, &backend, "1042", "I ate ").await.unwrap();
        assert!(reply.contains("Please provide a meal description to analyze."));
    }
}
