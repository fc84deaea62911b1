//! Trend and insight turns, from single-domain summaries to the
//! cross-domain health overview.

use vera_core::glucose::{self, TargetRange};

use crate::EngineError;
use crate::store::{
    GlucoseReading, GlucoseTrend, GlucoseTrends, HealthSummary, MoodTrend, MoodTrends,
    NutritionSummary, Store,
};

const MOOD_WINDOW_DAYS: u32 = 30;
const GLUCOSE_WINDOW_DAYS: u32 = 7;
const NUTRITION_WINDOW_DAYS: u32 = 7;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_mood(trends: &MoodTrends) -> String {
    if trends.entries_count == 0 {
        return "No mood entries found. Start logging your mood daily to see trends!".to_string();
    }
    format!(
        "**Entries:** {} in the past month\n\
         **Average Mood:** {}/10\n\
         **Range:** {}-{}/10\n\
         **Trend:** {}",
        trends.entries_count,
        trends.average,
        trends.min,
        trends.max,
        trends.trend.label()
    )
}

fn format_glucose(trends: &GlucoseTrends, readings: &[GlucoseReading], range: &TargetRange) -> String {
    if trends.readings_count == 0 || readings.is_empty() {
        return "No glucose readings found. Start logging readings to see trends!".to_string();
    }
    let in_range = readings
        .iter()
        .filter(|r| range.contains_target(r.reading))
        .count();
    let time_in_range = round1(in_range as f64 / readings.len() as f64 * 100.0);
    format!(
        "**Readings:** {} in the past week\n\
         **Average:** {} mg/dL\n\
         **Range:** {}-{} mg/dL\n\
         **Time in Range:** {time_in_range}%\n\
         **Target Range:** {}\n\
         **Trend:** {}",
        trends.readings_count,
        trends.average,
        trends.min,
        trends.max,
        range.describe(),
        trends.trend.label()
    )
}

fn nutrition_patterns(summary: &NutritionSummary, days: u32) -> Vec<&'static str> {
    let mut patterns = Vec::new();
    if summary.average_calories < 1200.0 {
        patterns.push("Your calorie intake is below typical daily needs");
    } else if summary.average_calories > 2500.0 {
        patterns.push("Your calorie intake is above typical daily needs");
    } else {
        patterns.push("Your calorie intake is within typical daily ranges");
    }
    if summary.average_protein < 50.0 {
        patterns.push("Your protein intake may be below recommended levels");
    } else if summary.average_protein > 120.0 {
        patterns.push("You're getting plenty of protein in your diet");
    } else {
        patterns.push("Your protein intake is well-balanced");
    }
    if summary.entries_count < (days as usize) * 2 {
        patterns.push("You might benefit from eating more frequent meals");
    } else {
        patterns.push("You maintain a good meal frequency");
    }
    patterns
}

fn format_nutrition(summary: &NutritionSummary, days: u32) -> String {
    if summary.entries_count == 0 {
        return "No nutrition data found. Start logging meals to see insights!".to_string();
    }
    let meals_per_day = round1(summary.entries_count as f64 / f64::from(days));
    let patterns = nutrition_patterns(summary, days)
        .iter()
        .map(|p| format!("• {p}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "**Days Analyzed:** {days}\n\
         **Daily Averages:**\n\
         • Calories: {} kcal\n\
         • Carbs: {}g\n\
         • Protein: {}g\n\
         • Fat: {}g\n\
         • Meals per day: {meals_per_day}\n\n\
         **Patterns:**\n{patterns}",
        summary.average_calories, summary.average_carbs, summary.average_protein, summary.average_fat
    )
}

/// Correlations across domains, each gated on both sides having data.
fn cross_domain_insights(summary: &HealthSummary) -> Vec<&'static str> {
    let mut insights = Vec::new();
    let mood = &summary.mood;
    let glucose = &summary.glucose;
    let nutrition = &summary.nutrition;

    if mood.entries_count > 0 && glucose.readings_count > 0 {
        if mood.average < 4.0 && glucose.average > 180.0 {
            insights.push(
                "Your mood and glucose levels suggest stress may be affecting both - consider stress management techniques",
            );
        } else if mood.average > 7.0 && glucose.average < 100.0 {
            insights.push(
                "Great balance! Your positive mood and stable glucose levels indicate good health management",
            );
        }
    }

    if nutrition.entries_count > 0 && glucose.readings_count > 0 {
        if nutrition.average_calories > 2000.0 && glucose.average > 180.0 {
            insights.push("High calorie intake may be affecting glucose levels - consider portion control");
        } else if nutrition.average_carbs > 250.0 && glucose.average > 160.0 {
            insights.push(
                "High carbohydrate intake may be impacting glucose - consider carb timing and quality",
            );
        }
    }

    if mood.entries_count > 0 && nutrition.entries_count > 0 {
        if mood.average < 4.0 && nutrition.average_calories < 1200.0 {
            insights.push("Low mood and low calorie intake may be related - consider mood-supporting foods");
        } else if mood.average > 7.0 && nutrition.average_protein > 80.0 {
            insights.push("Good protein intake may be supporting your positive mood - keep it up!");
        }
    }

    insights
}

fn mood_trend_emoji(trend: MoodTrend) -> &'static str {
    match trend {
        MoodTrend::Improving => "📈",
        MoodTrend::Declining => "📉",
        _ => "➡️",
    }
}

fn glucose_trend_emoji(trend: GlucoseTrend) -> &'static str {
    match trend {
        GlucoseTrend::Increasing => "📈",
        GlucoseTrend::Decreasing => "📉",
        _ => "➡️",
    }
}

fn format_comprehensive(summary: &HealthSummary) -> String {
    let mut text = format!(
        "📊 **Comprehensive Health Summary for {}**\n\n\
         **👤 Profile:** {} diet\n",
        summary.profile.name, summary.profile.dietary_category
    );
    if !summary.profile.medical_conditions.is_empty() {
        text.push_str(&format!(
            "**🏥 Conditions:** {}\n",
            summary.profile.medical_conditions.join(", ")
        ));
    }
    text.push('\n');

    if summary.mood.entries_count > 0 {
        text.push_str(&format!(
            "😊 **Mood:** {}/10 average {} ({} entries)\n",
            summary.mood.average,
            mood_trend_emoji(summary.mood.trend),
            summary.mood.entries_count
        ));
    }
    if summary.glucose.readings_count > 0 {
        text.push_str(&format!(
            "🩸 **Glucose:** {} mg/dL average {} ({} readings)\n",
            summary.glucose.average,
            glucose_trend_emoji(summary.glucose.trend),
            summary.glucose.readings_count
        ));
    }
    if summary.nutrition.entries_count > 0 {
        text.push_str(&format!(
            "🍽️ **Nutrition:** {:.0} kcal/day average ({} meals)\n",
            summary.nutrition.average_calories, summary.nutrition.entries_count
        ));
    }

    let insights = cross_domain_insights(summary);
    if !insights.is_empty() {
        text.push_str("\n💡 **Cross-Agent Insights:**\n");
        for insight in insights {
            text.push_str(&format!("• {insight}\n"));
        }
    }

    text.push_str(
        "\n**🔍 Quick Actions:**\n\
         • 'Show mood trends' for detailed mood analysis\n\
         • 'Show glucose trends' for CGM insights\n\
         • 'Show nutrition insights' for dietary analysis\n\
         • 'Generate meal plan' for tomorrow's meals\n",
    );
    text
}

/// Answer an insights request: a single-domain trend view when the input
/// names one, otherwise the full cross-domain summary.
pub async fn handle(store: &Store, user_id: &str, input: &str) -> Result<String, EngineError> {
    let lowered = input.to_lowercase();

    if lowered.contains("mood") {
        let trends = store.mood_trends(user_id, MOOD_WINDOW_DAYS).await?;
        store
            .log_interaction(
                user_id,
                "insights",
                "store",
                "trend_analysis",
                &format!("Analyzed {} mood entries over {MOOD_WINDOW_DAYS} days", trends.entries_count),
            )
            .await?;
        return Ok(format!("📊 **Mood Trends:**\n\n{}", format_mood(&trends)));
    }

    if lowered.contains("glucose") || lowered.contains("cgm") {
        let range = match store.user_by_id(user_id).await? {
            Some(profile) => glucose::range_for_conditions(&profile.medical_conditions),
            None => TargetRange::DEFAULT,
        };
        let trends = store.glucose_trends(user_id, GLUCOSE_WINDOW_DAYS).await?;
        let readings = store.recent_glucose(user_id, GLUCOSE_WINDOW_DAYS).await?;
        store
            .log_interaction(
                user_id,
                "insights",
                "store",
                "trend_analysis",
                &format!(
                    "Analyzed {} glucose readings over {GLUCOSE_WINDOW_DAYS} days",
                    trends.readings_count
                ),
            )
            .await?;
        return Ok(format!(
            "📈 **Glucose Trends:**\n\n{}",
            format_glucose(&trends, &readings, &range)
        ));
    }

    if lowered.contains("nutrition") || lowered.contains("food") {
        let summary = store.nutrition_summary(user_id, NUTRITION_WINDOW_DAYS).await?;
        store
            .log_interaction(
                user_id,
                "insights",
                "store",
                "nutrition_analysis",
                &format!(
                    "Analyzed {} meals over {NUTRITION_WINDOW_DAYS} days",
                    summary.entries_count
                ),
            )
            .await?;
        return Ok(format!(
            "🥗 **Nutrition Insights:**\n\n{}",
            format_nutrition(&summary, NUTRITION_WINDOW_DAYS)
        ));
    }

    let Some(summary) = store.health_summary(user_id).await? else {
        return Ok("Unable to retrieve health data. Please log in first.".to_string());
    };
    Ok(format_comprehensive(&summary))
}
