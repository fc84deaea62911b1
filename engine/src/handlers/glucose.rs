//! Glucose reading turns: extraction, classification, alerting.

use vera_core::extract;
use vera_core::glucose::{self, Severity, TargetRange};

use crate::EngineError;
use crate::store::{GlucoseTrend, Store};

fn severity_message(severity: Severity, reading: f64) -> String {
    match severity {
        Severity::CriticalLow => format!("🚨 CRITICAL LOW: {reading} mg/dL"),
        Severity::Low => format!("⚠️ LOW: {reading} mg/dL"),
        Severity::Normal => format!("✅ NORMAL: {reading} mg/dL - Great job!"),
        Severity::High => format!("⚠️ HIGH: {reading} mg/dL"),
        Severity::CriticalHigh => format!("🚨 CRITICAL HIGH: {reading} mg/dL"),
    }
}

fn severity_recommendations(severity: Severity) -> Vec<&'static str> {
    match severity {
        Severity::CriticalLow => vec![
            "Consume 15g of fast-acting carbs immediately",
            "Test again in 15 minutes",
            "Contact healthcare provider if severe symptoms",
        ],
        Severity::Low => vec![
            "Consider a small snack with carbohydrates",
            "Monitor closely for symptoms",
            "Test again in 30 minutes",
        ],
        Severity::Normal => vec![
            "Keep up the good work!",
            "Continue current management plan",
        ],
        Severity::High => vec![
            "Stay hydrated",
            "Consider light physical activity if safe",
            "Monitor carbohydrate intake",
            "Test again in 1-2 hours",
        ],
        Severity::CriticalHigh => vec![
            "Check for ketones if diabetic",
            "Stay hydrated",
            "Contact healthcare provider immediately",
            "Avoid strenuous exercise",
        ],
    }
}

fn range_recommendations(reading: f64, range: &TargetRange) -> Vec<&'static str> {
    if reading < range.target_min {
        vec![
            "Consider having a small snack with protein and complex carbs",
            "Monitor for symptoms of hypoglycemia",
        ]
    } else if reading > range.target_max {
        vec![
            "Consider light physical activity if safe",
            "Stay well hydrated",
            "Monitor for symptoms of hyperglycemia",
        ]
    } else {
        Vec::new()
    }
}

/// Extract a reading, classify it against the user's personalized range,
/// persist reading and alert, and build the reply. The reading is stored
/// even when it is alert-worthy; only implausible values are rejected.
pub async fn handle(store: &Store, user_id: &str, input: &str) -> Result<String, EngineError> {
    let Some(reading) = extract::glucose_value(input) else {
        return Ok(
            "I couldn't find a glucose reading in your message. Please include the number, \
             like 'My glucose is 120' or '125 mg/dL'"
                .to_string(),
        );
    };

    if !glucose::is_measurable(reading) {
        return Ok(format!(
            "Invalid glucose reading: {reading} mg/dL. Please check your meter and try again."
        ));
    }

    let range = match store.user_by_id(user_id).await? {
        Some(profile) => glucose::range_for_conditions(&profile.medical_conditions),
        None => TargetRange::DEFAULT,
    };
    let severity = glucose::classify(reading, &range);
    let message = severity_message(severity, reading);

    store.record_glucose(user_id, reading).await?;
    if severity.is_alert() {
        store
            .record_glucose_alert(user_id, reading, severity.as_str(), &message)
            .await?;
    }
    store
        .log_interaction(
            user_id,
            "glucose",
            "store",
            "glucose_logging",
            &format!("Reading: {reading} mg/dL, Alert: {}", severity.as_str()),
        )
        .await?;

    let mut recommendations: Vec<&str> = severity_recommendations(severity);
    recommendations.extend(range_recommendations(reading, &range));

    let trends = store.glucose_trends(user_id, 3).await?;
    if trends.readings_count >= 2 {
        match trends.trend {
            GlucoseTrend::Increasing => recommendations
                .push("Your glucose has been trending higher - consider reviewing recent meals"),
            GlucoseTrend::Decreasing => recommendations
                .push("Your glucose has been trending lower - monitor for hypoglycemia"),
            _ => {}
        }
    }

    let bullets = recommendations
        .iter()
        .map(|r| format!("• {r}"))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!(
        "{message}\n\n**Target Range:** {}\n\n💡 **Recommendations:**\n{bullets}",
        range.describe()
    ))
}
