//! Meal plan generation turns.

use chrono::NaiveDate;
use vera_core::extract;

use crate::EngineError;
use crate::backend::{self, GenerativeBackend, MealPlan, PlanContext};
use crate::store::{HealthSummary, Store};

fn plan_recommendations(summary: &HealthSummary) -> Vec<&'static str> {
    let mut recs = Vec::new();
    let conditions = &summary.profile.medical_conditions;
    if conditions.iter().any(|c| c.to_lowercase().contains("diabetes")) {
        recs.push("Monitor blood glucose after meals");
        recs.push("Consider the carb content timing with medication");
    }
    if conditions.iter().any(|c| c == "Hypertension") {
        recs.push("Watch sodium content in processed foods");
    }
    if summary.mood.entries_count > 0 && summary.mood.average < 4.0 {
        recs.push("Include mood-boosting foods like omega-3 rich fish");
    }
    recs
}

fn format_plan(
    date: NaiveDate,
    summary: &HealthSummary,
    plan: &MealPlan,
    recommendations: &[&str],
) -> String {
    let mut message = format!(
        "🍽️ **Personalized Meal Plan for {date}**\n\n\
         👤 Planned for: {} ({})",
        summary.profile.name, summary.profile.dietary_category
    );
    if summary.mood.entries_count > 0 {
        message.push_str(&format!("\n📊 Recent Mood: {}/10", summary.mood.average));
    }
    if summary.glucose.readings_count > 0 {
        message.push_str(&format!("\n📈 Recent CGM: {} mg/dL", summary.glucose.average));
    }

    message.push_str(&format!(
        "\n\n🌅 **Breakfast:** {}\n\n🌞 **Lunch:** {}\n\n🌙 **Dinner:** {}",
        plan.breakfast, plan.lunch, plan.dinner
    ));

    message.push_str(&format!(
        "\n\n📊 **Daily Nutrition Summary:**\n\
         • Total Calories: {} kcal\n\
         • Carbohydrates: {}g\n\
         • Protein: {}g\n\
         • Fat: {}g",
        plan.total_calories, plan.total_carbs, plan.total_protein, plan.total_fat
    ));

    if !recommendations.is_empty() {
        let bullets = recommendations
            .iter()
            .map(|r| format!("• {r}"))
            .collect::<Vec<_>>()
            .join("\n");
        message.push_str(&format!("\n\n💡 **Health Recommendations:**\n{bullets}"));
    }

    if let Some(notes) = &plan.notes {
        message.push_str(&format!("\n\n📝 **Notes:** {notes}"));
    }

    message
}

/// Generate and persist a one-day meal plan for the mentioned date
/// (default today), fed with the user's recent health context.
pub async fn handle(
    store: &Store,
    backend: &dyn GenerativeBackend,
    user_id: &str,
    input: &str,
    today: NaiveDate,
) -> Result<String, EngineError> {
    let plan_date = extract::date_mention(input, today).unwrap_or(today);

    let Some(summary) = store.health_summary(user_id).await? else {
        return Ok("Unable to retrieve user information for meal planning.".to_string());
    };

    store
        .log_interaction(
            user_id,
            "plan",
            "store",
            "meal_planning",
            &format!("Meal plan requested for {plan_date}"),
        )
        .await?;

    let ctx = PlanContext {
        name: summary.profile.name.clone(),
        dietary_category: summary.profile.dietary_category.clone(),
        medical_conditions: summary.profile.medical_conditions.clone(),
        recent_mood_avg: (summary.mood.entries_count > 0).then_some(summary.mood.average),
        recent_cgm_avg: (summary.glucose.readings_count > 0).then_some(summary.glucose.average),
    };
    let plan = backend::generate_meal_plan(backend, &ctx).await;
    store.record_meal_plan(user_id, plan_date, &plan).await?;

    let recommendations = plan_recommendations(&summary);
    Ok(format_plan(plan_date, &summary, &plan, &recommendations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use crate::store::{seed_user, seed_user_full, test_store};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const PLAN_JSON: &str = r#"{"breakfast": "Veggie omelette", "lunch": "Paneer wrap",
        "dinner": "Dal with rice", "total_calories": 1700, "total_carbs": 190,
        "total_protein": 85, "total_fat": 55, "notes": "Spread carbs across the day"}"#;

    #[tokio::test]
    async fn plan_for_tomorrow_is_stored_and_formatted() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &[]).await;
        let backend = ScriptedBackend::new([PLAN_JSON]);

        let reply = handle(&store, &backend, "1042", "plan my meals for tomorrow", d(2025, 3, 10))
            .await
            .unwrap();
        assert!(reply.contains("🍽️ **Personalized Meal Plan for 2025-03-11**"));
        assert!(reply.contains("👤 Planned for: Ananya Pillai (Standard)"));
        assert!(reply.contains("🌅 **Breakfast:** Veggie omelette"));
        assert!(reply.contains("• Total Calories: 1700 kcal"));
        assert!(reply.contains("📝 **Notes:** Spread carbs across the day"));

        let stored_date: String =
            sqlx::query_scalar("SELECT plan_date FROM meal_plans WHERE user_id = '1042'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(stored_date, "2025-03-11");
    }

    #[tokio::test]
    async fn diabetic_plan_carries_glucose_recommendations() {
        let store = test_store().await;
        seed_user(&store, "1042", "Ananya Pillai", &["Type 2 Diabetes", "Hypertension"]).await;
        let backend = ScriptedBackend::new([PLAN_JSON]);

        let reply = handle(&store, &backend, "1042", "generate a meal plan", d(2025, 3, 10))
            .await
            .unwrap();
        assert!(reply.contains("Monitor blood glucose after meals"));
        assert!(reply.contains("Watch sodium content in processed foods"));
        // No mood or glucose history, so no context lines.
        assert!(!reply.contains("Recent Mood"));
        assert!(!reply.contains("Recent CGM"));
    }

    #[tokio::test]
    async fn low_mood_history_adds_the_mood_food_suggestion() {
        let store = test_store().await;
        seed_user_full(&store, "1042", "Ananya Pillai", "Vegetarian", &[]).await;
        store.record_mood("1042", "sad", 3).await.unwrap();
        store.record_mood("1042", "sad", 3).await.unwrap();
        store.record_glucose("1042", 110.0).await.unwrap();
        let backend = ScriptedBackend::new([PLAN_JSON]);

        let reply = handle(&store, &backend, "1042", "meal plan for today", d(2025, 3, 10))
            .await
            .unwrap();
        assert!(reply.contains("📊 Recent Mood: 3/10"));
        assert!(reply.contains("📈 Recent CGM: 110 mg/dL"));
        assert!(reply.contains("Include mood-boosting foods like omega-3 rich fish"));
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_a_fixed_plan() {
        let store = test_store().await;
        seed_user_full(&store, "1042", "Ananya Pillai", "Vegan", &[]).await;
        let backend = ScriptedBackend::failing();

        let reply = handle(&store, &backend, "1042", "plan meals", d(2025, 3, 10)).await.unwrap();
        assert!(reply.contains("Oatmeal with berries and almond butter"));
        assert!(reply.contains("📝 **Notes:** Plant-based protein sources included"));
    }
}
