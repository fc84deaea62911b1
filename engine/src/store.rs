//! SQLite persistence for user profiles and tracked health data.
//!
//! All accessors take the user id explicitly; nothing here knows about
//! sessions. Timestamps are written from Rust as RFC 3339 UTC so lexical
//! ordering matches chronological ordering.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::backend::{MealPlan, Nutrients};

/// A user record with the medical conditions list decoded from JSON.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user_id: String,
    pub name: String,
    pub city: String,
    pub dietary_category: String,
    pub medical_conditions: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: String,
    name: String,
    city: String,
    dietary_category: String,
    medical_conditions: String,
}

impl UserRow {
    fn into_profile(self) -> UserProfile {
        let medical_conditions = serde_json::from_str(&self.medical_conditions).unwrap_or_else(|err| {
            tracing::warn!(user_id = %self.user_id, %err, "unparseable medical_conditions, treating as empty");
            Vec::new()
        });
        UserProfile {
            user_id: self.user_id,
            name: self.name,
            city: self.city,
            dietary_category: self.dietary_category,
            medical_conditions,
        }
    }
}

/// A row from a name search, before any ranking.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserMatch {
    pub user_id: String,
    pub name: String,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodTrend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
    NoData,
}

impl MoodTrend {
    pub fn label(self) -> &'static str {
        match self {
            MoodTrend::Improving => "Improving",
            MoodTrend::Declining => "Declining",
            MoodTrend::Stable => "Stable",
            MoodTrend::InsufficientData => "Insufficient Data",
            MoodTrend::NoData => "No Data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlucoseTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
    NoData,
}

impl GlucoseTrend {
    pub fn label(self) -> &'static str {
        match self {
            GlucoseTrend::Increasing => "Increasing",
            GlucoseTrend::Decreasing => "Decreasing",
            GlucoseTrend::Stable => "Stable",
            GlucoseTrend::InsufficientData => "Insufficient Data",
            GlucoseTrend::NoData => "No Data",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MoodEntry {
    pub mood_label: String,
    pub mood_score: i64,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct MoodTrends {
    pub entries_count: usize,
    pub average: f64,
    pub min: i64,
    pub max: i64,
    pub trend: MoodTrend,
    pub recent: Vec<MoodEntry>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GlucoseReading {
    pub reading: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct GlucoseTrends {
    pub readings_count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub trend: GlucoseTrend,
    pub recent: Vec<GlucoseReading>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodEntry {
    pub meal_description: String,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub calories: Option<f64>,
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct NutritionSummary {
    pub entries_count: usize,
    pub average_calories: f64,
    pub average_carbs: f64,
    pub average_protein: f64,
    pub average_fat: f64,
    pub recent: Vec<FoodEntry>,
}

/// Everything the insights and planning handlers need about one user.
#[derive(Debug, Clone)]
pub struct HealthSummary {
    pub profile: UserProfile,
    pub mood: MoodTrends,
    pub glucose: GlucoseTrends,
    pub nutrition: NutritionSummary,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn since(days: u32) -> String {
    (Utc::now() - Duration::days(i64::from(days))).to_rfc3339()
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Split newest-first values into a recent half and an older half and
/// compare their means against a threshold. Returns None when the halves
/// cannot be formed.
fn half_split_delta(values: &[f64]) -> Option<f64> {
    let mid = values.len() / 2;
    if mid == 0 || mid == values.len() {
        return None;
    }
    let recent_avg = values[..mid].iter().sum::<f64>() / mid as f64;
    let older_avg = values[mid..].iter().sum::<f64>() / (values.len() - mid) as f64;
    Some(recent_avg - older_avg)
}

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Store { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn user_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, name, city, dietary_category, medical_conditions \
             FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRow::into_profile))
    }

    /// Substring name search, case-insensitive via LIKE.
    pub async fn users_by_name(&self, name: &str) -> Result<Vec<UserMatch>, sqlx::Error> {
        sqlx::query_as::<_, UserMatch>(
            "SELECT user_id, name, city FROM users WHERE name LIKE ?",
        )
        .bind(format!("%{name}%"))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn record_mood(
        &self,
        user_id: &str,
        label: &str,
        score: u8,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO mood_tracking (user_id, mood_label, mood_score, timestamp) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(label)
        .bind(i64::from(score))
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rolling average of mood scores over the window, rounded to two
    /// decimals. None when the window is empty.
    pub async fn mood_rolling_average(
        &self,
        user_id: &str,
        days: u32,
    ) -> Result<Option<f64>, sqlx::Error> {
        let avg: Option<f64> = sqlx::query_scalar(
            "SELECT AVG(mood_score) FROM mood_tracking WHERE user_id = ? AND timestamp >= ?",
        )
        .bind(user_id)
        .bind(since(days))
        .fetch_one(&self.pool)
        .await?;
        Ok(avg.map(round2))
    }

    pub async fn mood_trends(&self, user_id: &str, days: u32) -> Result<MoodTrends, sqlx::Error> {
        let entries = sqlx::query_as::<_, MoodEntry>(
            "SELECT mood_label, mood_score, timestamp FROM mood_tracking \
             WHERE user_id = ? AND timestamp >= ? ORDER BY timestamp DESC",
        )
        .bind(user_id)
        .bind(since(days))
        .fetch_all(&self.pool)
        .await?;

        if entries.is_empty() {
            return Ok(MoodTrends {
                entries_count: 0,
                average: 0.0,
                min: 0,
                max: 0,
                trend: MoodTrend::NoData,
                recent: Vec::new(),
            });
        }

        let scores: Vec<f64> = entries.iter().map(|e| e.mood_score as f64).collect();
        let average = round1(scores.iter().sum::<f64>() / scores.len() as f64);
        let min = entries.iter().map(|e| e.mood_score).min().unwrap_or(0);
        let max = entries.iter().map(|e| e.mood_score).max().unwrap_or(0);

        let trend = if scores.len() < 2 {
            MoodTrend::InsufficientData
        } else {
            match half_split_delta(&scores) {
                Some(delta) if delta > 0.5 => MoodTrend::Improving,
                Some(delta) if delta < -0.5 => MoodTrend::Declining,
                _ => MoodTrend::Stable,
            }
        };

        let recent = entries.into_iter().take(5).collect();
        Ok(MoodTrends {
            entries_count: scores.len(),
            average,
            min,
            max,
            trend,
            recent,
        })
    }

    pub async fn record_glucose(&self, user_id: &str, reading: f64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO cgm_readings (user_id, reading, timestamp) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(reading)
            .bind(now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn record_glucose_alert(
        &self,
        user_id: &str,
        reading: f64,
        alert_type: &str,
        message: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO cgm_alerts (user_id, reading, alert_type, message, timestamp) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(reading)
        .bind(alert_type)
        .bind(message)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent_glucose(
        &self,
        user_id: &str,
        days: u32,
    ) -> Result<Vec<GlucoseReading>, sqlx::Error> {
        sqlx::query_as::<_, GlucoseReading>(
            "SELECT reading, timestamp FROM cgm_readings \
             WHERE user_id = ? AND timestamp >= ? ORDER BY timestamp DESC",
        )
        .bind(user_id)
        .bind(since(days))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn glucose_trends(
        &self,
        user_id: &str,
        days: u32,
    ) -> Result<GlucoseTrends, sqlx::Error> {
        let readings = self.recent_glucose(user_id, days).await?;

        if readings.is_empty() {
            return Ok(GlucoseTrends {
                readings_count: 0,
                average: 0.0,
                min: 0.0,
                max: 0.0,
                trend: GlucoseTrend::NoData,
                recent: Vec::new(),
            });
        }

        let values: Vec<f64> = readings.iter().map(|r| r.reading).collect();
        let average = round1(values.iter().sum::<f64>() / values.len() as f64);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Glucose needs a wider window than mood before a trend is called.
        let trend = if values.len() < 3 {
            GlucoseTrend::InsufficientData
        } else {
            match half_split_delta(&values) {
                Some(delta) if delta > 20.0 => GlucoseTrend::Increasing,
                Some(delta) if delta < -20.0 => GlucoseTrend::Decreasing,
                _ => GlucoseTrend::Stable,
            }
        };

        let count = values.len();
        let recent = readings.into_iter().take(5).collect();
        Ok(GlucoseTrends {
            readings_count: count,
            average,
            min,
            max,
            trend,
            recent,
        })
    }

    pub async fn record_meal(
        &self,
        user_id: &str,
        description: &str,
        nutrients: &Nutrients,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO food_intake (user_id, meal_description, carbs, protein, fat, calories, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(description)
        .bind(nutrients.carbs)
        .bind(nutrients.protein)
        .bind(nutrients.fat)
        .bind(nutrients.calories)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn nutrition_summary(
        &self,
        user_id: &str,
        days: u32,
    ) -> Result<NutritionSummary, sqlx::Error> {
        let entries = sqlx::query_as::<_, FoodEntry>(
            "SELECT meal_description, carbs, protein, fat, calories, timestamp FROM food_intake \
             WHERE user_id = ? AND timestamp >= ? ORDER BY timestamp DESC",
        )
        .bind(user_id)
        .bind(since(days))
        .fetch_all(&self.pool)
        .await?;

        if entries.is_empty() {
            return Ok(NutritionSummary {
                entries_count: 0,
                average_calories: 0.0,
                average_carbs: 0.0,
                average_protein: 0.0,
                average_fat: 0.0,
                recent: Vec::new(),
            });
        }

        let count = entries.len() as f64;
        let sum = |f: fn(&FoodEntry) -> Option<f64>| {
            entries.iter().map(|e| f(e).unwrap_or(0.0)).sum::<f64>()
        };
        let average_calories = round1(sum(|e| e.calories) / count);
        let average_carbs = round1(sum(|e| e.carbs) / count);
        let average_protein = round1(sum(|e| e.protein) / count);
        let average_fat = round1(sum(|e| e.fat) / count);

        let entries_count = entries.len();
        let recent = entries.into_iter().take(5).collect();
        Ok(NutritionSummary {
            entries_count,
            average_calories,
            average_carbs,
            average_protein,
            average_fat,
            recent,
        })
    }

    pub async fn record_meal_plan(
        &self,
        user_id: &str,
        plan_date: NaiveDate,
        plan: &MealPlan,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO meal_plans (user_id, plan_date, breakfast, lunch, dinner, \
             total_calories, total_carbs, total_protein, total_fat, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(plan_date.to_string())
        .bind(&plan.breakfast)
        .bind(&plan.lunch)
        .bind(&plan.dinner)
        .bind(plan.total_calories)
        .bind(plan.total_carbs)
        .bind(plan.total_protein)
        .bind(plan.total_fat)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Audit trail of which handler produced or consumed what.
    pub async fn log_interaction(
        &self,
        user_id: &str,
        source: &str,
        target: &str,
        data_type: &str,
        data_summary: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO handler_interactions (user_id, source, target, data_type, data_summary, timestamp) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(source)
        .bind(target)
        .bind(data_type)
        .bind(data_summary)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// One-week snapshot across all tracked domains, or None for an
    /// unknown user.
    pub async fn health_summary(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthSummary>, sqlx::Error> {
        let Some(profile) = self.user_by_id(user_id).await? else {
            return Ok(None);
        };
        let mood = self.mood_trends(user_id, 7).await?;
        let glucose = self.glucose_trends(user_id, 7).await?;
        let nutrition = self.nutrition_summary(user_id, 7).await?;
        Ok(Some(HealthSummary {
            profile,
            mood,
            glucose,
            nutrition,
        }))
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("migrations should run");
    Store::new(pool)
}

#[cfg(test)]
pub(crate) async fn seed_user(store: &Store, user_id: &str, name: &str, conditions: &[&str]) {
    seed_user_full(store, user_id, name, "Standard", conditions).await;
}

#[cfg(test)]
pub(crate) async fn seed_user_full(
    store: &Store,
    user_id: &str,
    name: &str,
    dietary: &str,
    conditions: &[&str],
) {
    sqlx::query(
        "INSERT INTO users (user_id, name, city, dietary_category, medical_conditions) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(name)
    .bind("Pune")
    .bind(dietary)
    .bind(serde_json::to_string(conditions).unwrap())
    .execute(store.pool())
    .await
    .expect("seed user");
}
