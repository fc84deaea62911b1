//! Client for the generative text backend.
//!
//! The backend is only trusted to produce prose; everything structured is
//! carved out of the reply as JSON and validated here. Any failure, from
//! transport to malformed JSON, degrades to deterministic fallback values
//! so a turn never depends on the backend behaving.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned an empty reply")]
    EmptyReply,
}

/// Text-in, text-out generation seam. Handlers depend on this trait so
/// tests can script replies without a live service.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// HTTP implementation speaking a minimal JSON generate protocol.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpBackend {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[async_trait]
impl GenerativeBackend for HttpBackend {
    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let url = format!("{}/v1/generate", self.base_url.trim_end_matches('/'));
        let mut request = self.client.post(&url).json(&GenerateRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        let text = response.text.trim().to_string();
        if text.is_empty() {
            return Err(BackendError::EmptyReply);
        }
        Ok(text)
    }
}

/// Macronutrient estimate for a single meal, grams and kcal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub calories: f64,
}

/// A one-day plan of three meals with estimated totals.
#[derive(Debug, Clone, PartialEq)]
pub struct MealPlan {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
    pub total_calories: f64,
    pub total_carbs: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub notes: Option<String>,
}

/// User context fed into the meal plan prompt.
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub name: String,
    pub dietary_category: String,
    pub medical_conditions: Vec<String>,
    pub recent_mood_avg: Option<f64>,
    pub recent_cgm_avg: Option<f64>,
}

/// Slice of `text` between the first '{' and the last '}', inclusive.
/// Generative replies routinely wrap JSON in prose or code fences.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn fallback_nutrients() -> Nutrients {
    Nutrients {
        carbs: 30.0,
        protein: 15.0,
        fat: 10.0,
        calories: 250.0,
    }
}

pub fn fallback_meal_plan(dietary_category: &str) -> MealPlan {
    if dietary_category.to_lowercase().contains("vegan") {
        MealPlan {
            breakfast: "Oatmeal with berries and almond butter (1 cup oats, 1/2 cup berries, 2 tbsp almond butter)".into(),
            lunch: "Quinoa buddha bowl with chickpeas and vegetables (1 cup quinoa, 1/2 cup chickpeas, mixed vegetables)".into(),
            dinner: "Lentil curry with brown rice (1 cup lentils, 1 cup brown rice, spices)".into(),
            total_calories: 1800.0,
            total_carbs: 250.0,
            total_protein: 75.0,
            total_fat: 60.0,
            notes: Some("Plant-based protein sources included".into()),
        }
    } else {
        MealPlan {
            breakfast: "Greek yogurt with berries and granola (1 cup yogurt, 1/2 cup berries, 1/4 cup granola)".into(),
            lunch: "Grilled chicken salad with mixed greens (4 oz chicken, 2 cups mixed greens, olive oil dressing)".into(),
            dinner: "Baked salmon with roasted vegetables (4 oz salmon, 2 cups mixed vegetables)".into(),
            total_calories: 1600.0,
            total_carbs: 150.0,
            total_protein: 120.0,
            total_fat: 50.0,
            notes: Some("Balanced macronutrients for general health".into()),
        }
    }
}

fn parse_nutrients(reply: &str) -> Option<Nutrients> {
    let json = extract_json_object(reply)?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    Some(Nutrients {
        carbs: round1(value.get("carbs")?.as_f64()?),
        protein: round1(value.get("protein")?.as_f64()?),
        fat: round1(value.get("fat")?.as_f64()?),
        calories: round1(value.get("calories")?.as_f64()?),
    })
}

/// Estimate macronutrients for a meal description. Never fails; bad
/// backend output falls back to conservative defaults.
pub async fn analyze_nutrients(backend: &dyn GenerativeBackend, meal: &str) -> Nutrients {
    let prompt = format!(
        "Analyze the following meal description and estimate the macronutrients.\n\
         Provide your response in this exact JSON format:\n\
         {{\"carbs\": <grams>, \"protein\": <grams>, \"fat\": <grams>, \"calories\": <total_calories>}}\n\n\
         Meal: {meal}\n\n\
         Be realistic with portions and provide reasonable estimates.\n\
         Only respond with the JSON, no other text."
    );

    match backend.generate(&prompt).await {
        Ok(reply) => parse_nutrients(&reply).unwrap_or_else(|| {
            tracing::warn!(reply = %reply, "unusable nutrition reply, using fallback estimate");
            fallback_nutrients()
        }),
        Err(err) => {
            tracing::warn!(%err, "nutrition analysis failed, using fallback estimate");
            fallback_nutrients()
        }
    }
}

fn parse_meal_plan(reply: &str) -> Option<MealPlan> {
    let json = extract_json_object(reply)?;
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let grab_f64 = |key: &str| value.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0);
    Some(MealPlan {
        breakfast: value.get("breakfast")?.as_str()?.to_string(),
        lunch: value.get("lunch")?.as_str()?.to_string(),
        dinner: value.get("dinner")?.as_str()?.to_string(),
        total_calories: grab_f64("total_calories"),
        total_carbs: grab_f64("total_carbs"),
        total_protein: grab_f64("total_protein"),
        total_fat: grab_f64("total_fat"),
        notes: value.get("notes").and_then(|v| v.as_str()).map(String::from),
    })
}

/// Generate a personalized one-day meal plan. Falls back to a fixed plan
/// matched to the dietary category when the backend reply is unusable.
pub async fn generate_meal_plan(backend: &dyn GenerativeBackend, ctx: &PlanContext) -> MealPlan {
    let conditions = ctx.medical_conditions.join(", ");
    let mood = ctx
        .recent_mood_avg
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"));
    let cgm = ctx
        .recent_cgm_avg
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.1}"));

    let prompt = format!(
        "Create a personalized daily meal plan for a user with the following profile:\n\
         - Dietary Category: {dietary}\n\
         - Medical Conditions: {conditions}\n\
         - Recent Average Mood: {mood}/10\n\
         - Recent Average CGM: {cgm} mg/dL\n\n\
         Guidelines:\n\
         - If diabetic: Focus on low glycemic index foods, limit simple carbs\n\
         - If hypertensive: Reduce sodium, emphasize potassium-rich foods\n\
         - If vegetarian/vegan: Ensure adequate protein sources\n\
         - Consider mood: If low mood, include mood-boosting foods\n\n\
         Provide response in this exact JSON format:\n\
         {{\"breakfast\": \"...\", \"lunch\": \"...\", \"dinner\": \"...\", \
         \"total_calories\": <number>, \"total_carbs\": <number>, \
         \"total_protein\": <number>, \"total_fat\": <number>, \"notes\": \"...\"}}\n\n\
         Only respond with the JSON, no other text.",
        dietary = ctx.dietary_category,
    );

    match backend.generate(&prompt).await {
        Ok(reply) => parse_meal_plan(&reply).unwrap_or_else(|| {
            tracing::warn!(reply = %reply, "unusable meal plan reply, using fallback plan");
            fallback_meal_plan(&ctx.dietary_category)
        }),
        Err(err) => {
            tracing::warn!(%err, "meal plan generation failed, using fallback plan");
            fallback_meal_plan(&ctx.dietary_category)
        }
    }
}

/// Scripted backend for tests: pops queued replies in order and errors
/// once the script runs dry.
#[cfg(test)]
pub struct ScriptedBackend {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<String, ()>>>,
}

#[cfg(test)]
impl ScriptedBackend {
    pub fn new(replies: impl IntoIterator<Item = &'static str>) -> Self {
        ScriptedBackend {
            replies: std::sync::Mutex::new(
                replies.into_iter().map(|r| Ok(r.to_string())).collect(),
            ),
        }
    }

    pub fn failing() -> Self {
        ScriptedBackend {
            replies: std::sync::Mutex::new(std::collections::VecDeque::from([Err(())])),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            _ => Err(BackendError::EmptyReply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_carved_out_of_surrounding_prose() {
        assert_eq!(
            extract_json_object("Sure! Here you go: {\"a\": 1} Hope that helps."),
            Some("{\"a\": 1}")
        );
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("} reversed {"), None);
    }

    #[tokio::test]
    async fn nutrients_parse_and_round() {
        let backend = ScriptedBackend::new([
            r#"{"carbs": 52.34, "protein": 31.0, "fat": 12.5, "calories": 450}"#,
        ]);
        let nutrients = analyze_nutrients(&backend, "chicken and rice").await;
        assert_eq!(nutrients.carbs, 52.3);
        assert_eq!(nutrients.calories, 450.0);
    }

    #[tokio::test]
    async fn missing_nutrient_field_falls_back() {
        let backend = ScriptedBackend::new([r#"{"carbs": 52, "protein": 31}"#]);
        let nutrients = analyze_nutrients(&backend, "chicken and rice").await;
        assert_eq!(nutrients, fallback_nutrients());
    }

    #[tokio::test]
    async fn backend_failure_falls_back() {
        let backend = ScriptedBackend::failing();
        let nutrients = analyze_nutrients(&backend, "anything").await;
        assert_eq!(nutrients, fallback_nutrients());
    }

    #[tokio::test]
    async fn meal_plan_requires_all_three_meals() {
        let ctx = PlanContext {
            name: "Ananya".into(),
            dietary_category: "Vegan".into(),
            medical_conditions: vec![],
            recent_mood_avg: None,
            recent_cgm_avg: None,
        };

        let incomplete = ScriptedBackend::new([r#"{"breakfast": "toast", "lunch": "soup"}"#]);
        let plan = generate_meal_plan(&incomplete, &ctx).await;
        assert_eq!(plan, fallback_meal_plan("Vegan"));
        assert!(plan.breakfast.contains("Oatmeal"));

        let complete = ScriptedBackend::new([
            r#"{"breakfast": "tofu scramble", "lunch": "chickpea wrap", "dinner": "dal", "total_calories": 1700}"#,
        ]);
        let plan = generate_meal_plan(&complete, &ctx).await;
        assert_eq!(plan.breakfast, "tofu scramble");
        assert_eq!(plan.total_calories, 1700.0);
        assert_eq!(plan.total_protein, 0.0);
    }
}
