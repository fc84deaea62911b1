//! Rule-based answers for turns that fit no tracking intent: FAQs,
//! emotional check-ins, nudges back toward the tracking features.

use std::sync::LazyLock;

use regex::Regex;
use vera_core::session::PriorContext;

/// FAQ table keyed on substrings of the lowercased input.
const FAQS: &[(&str, &str, &str)] = &[
    (
        "how to use",
        "This health tracking system helps you monitor mood, glucose levels, food intake, and plan meals. Start by logging in with your user ID, then choose what you'd like to track.",
        "Would you like to go to the main menu to start tracking?",
    ),
    (
        "what can you do",
        "I can help you: 1) Track your mood and emotions, 2) Monitor glucose readings, 3) Log food intake, 4) Plan healthy meals, 5) Answer general questions like this one!",
        "Which of these would you like to try?",
    ),
    (
        "forgot id",
        "No problem! I can help you find your user ID by searching with your name. Just tell me your name and I'll look it up.",
        "Would you like me to help you find your user ID now?",
    ),
    (
        "data privacy",
        "Your health data is stored securely and only used for your personal tracking and meal planning. We don't share your information with third parties.",
        "Do you have any other privacy concerns, or would you like to continue with health tracking?",
    ),
    (
        "glucose range",
        "Normal glucose levels are typically between 80-300 mg/dL for our tracking purposes. The system will alert you if readings are outside this range.",
        "Would you like to log a glucose reading now?",
    ),
    (
        "meal planning",
        "The meal planner creates personalized 3-meal daily plans based on your dietary preferences, medical conditions, recent mood, and glucose levels.",
        "Would you like to generate a meal plan?",
    ),
];

static EMOTIONAL_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"i'?m\s+(stupid|dumb|worthless|useless|terrible|awful|pathetic)",
        r"i\s+feel\s+like",
        r"i'?m\s+(so|really|very|extremely)\s+(sad|depressed|angry|frustrated|upset|down|low)",
        r"having\s+a\s+(bad|rough|terrible|awful)\s+day",
        r"life\s+is\s+(hard|difficult|tough)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid emotional pattern"))
    .collect()
});

static FOOD_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"i\s+(ate|had|consumed|eaten)\s+",
        r"just\s+(ate|had|finished)\s+",
        r"for\s+(breakfast|lunch|dinner)\s+i\s+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid food pattern"))
    .collect()
});

static GLUCOSE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d+\s*mg",
        r"blood\s+sugar\s+is\s+\d+",
        r"glucose\s+(reading|level)\s+\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid glucose pattern"))
    .collect()
});

static NEGATIVE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"you\s+are\s+(stupid|dumb|useless|terrible|awful|bad)",
        r"this\s+is\s+(stupid|dumb|useless|terrible|awful)",
        r"(stupid|dumb|useless|terrible|awful)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid negative pattern"))
    .collect()
});

const HEALTH_KEYWORDS: &[&str] = &[
    "health", "medical", "doctor", "medicine", "symptoms", "treatment", "diet", "exercise",
    "nutrition", "wellness", "fitness",
];

/// Keyword-to-nudge routing table, checked in order.
const ROUTING_MAP: &[(&[&str], &str)] = &[
    (
        &["mood", "feeling", "emotion", "happy", "sad", "excited", "tired", "anxious", "stressed", "depressed", "angry"],
        "It sounds like you might want to track your mood. Would you like to log how you're feeling today?",
    ),
    (
        &["glucose", "blood sugar", "cgm", "diabetes", "sugar level", "mg/dl", "blood test", "glucose reading"],
        "It looks like you're interested in glucose monitoring. Would you like to log a glucose reading?",
    ),
    (
        &["food", "eat", "ate", "meal", "lunch", "dinner", "breakfast", "snack", "calories", "nutrition", "hungry"],
        "I see you're talking about food! Would you like to log what you've eaten or are planning to eat?",
    ),
    (
        &["meal plan", "diet plan", "recipe", "menu", "dietary", "vegetarian", "vegan", "plan meals", "what to eat"],
        "It sounds like you need help with meal planning! Would you like me to generate a personalized meal plan for you?",
    ),
    (
        &["menu", "options", "what can", "help", "start over", "begin", "main"],
        "Would you like to see the main menu to choose what you'd like to track or plan today?",
    ),
];

pub const FEATURES: &str = "🏥 **Health Agent System Features**\n\n\
**🎭 Mood Tracking**\n\
• Log your daily mood with descriptive labels\n\
• View mood trends and rolling averages\n\
• Get personalized mood-boosting suggestions\n\
• Track patterns over time\n\n\
**🩸 Glucose Monitoring (CGM)**\n\
• Log glucose readings with smart validation\n\
• Get alerts for out-of-range readings\n\
• Medical condition-aware target ranges\n\
• Track glucose trends and time in range\n\n\
**🍽️ Food Intake Tracking**\n\
• Log meals with automatic nutrient analysis\n\
• AI-powered food categorization\n\
• Daily nutrition summaries\n\
• Dietary preference considerations\n\n\
**📋 Meal Planning**\n\
• Generate personalized 3-meal daily plans\n\
• Adapts to your medical conditions\n\
• Considers recent mood and glucose data\n\
• Customizable with shopping lists\n\n\
**❓ General Q&A Assistant**\n\
• Ask health and nutrition questions anytime\n\
• Get answers without losing your place\n\
• Helpful routing back to main features\n\
• FAQ support for common questions\n\n\
**🔐 Smart Authentication**\n\
• Secure user ID validation\n\
• Name-based user search\n\
• Personalized greetings with location\n\n\
**💡 Quick Commands:**\n\
• \"Track mood\" - Log how you're feeling\n\
• \"Log glucose\" - Record a CGM reading\n\
• \"Log meal\" - Track food intake\n\
• \"Plan meals\" - Generate meal suggestions\n\
• \"Show insights\" - View health trends\n\
• \"Help\" - See this feature list\n\n\
What would you like to try?";

fn matches_any(input: &str, patterns: &[Regex]) -> bool {
    patterns.iter().any(|re| re.is_match(input))
}

fn route_suggestion(input: &str) -> Option<&'static str> {
    ROUTING_MAP
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| input.contains(k)))
        .map(|(_, message)| *message)
}

/// Way back to whatever the user was doing before the detour.
fn resume_suggestion(prior: &PriorContext) -> Option<&'static str> {
    match prior.handler.as_str() {
        "mood_tracking" => Some("Would you like to get back to tracking your mood?"),
        "cgm_monitoring" => Some("Would you like to get back to logging glucose readings?"),
        "food_logging" => Some("Would you like to get back to logging your meals?"),
        "meal_planning" => Some("Would you like to get back to meal planning?"),
        "insights_request" => Some("Would you like to see more of your health insights?"),
        _ => None,
    }
}

/// Answer a general turn. Entirely rule-based; the generative backend is
/// never consulted here so off-topic turns stay fast and predictable.
/// `prior` is what the user was doing before this detour and feeds the
/// routing suggestion when the input itself names no feature.
pub fn handle(user_name: Option<&str>, input: &str, prior: Option<&PriorContext>) -> String {
    let lowered = input.to_lowercase();
    let lowered = lowered.trim();

    for (key, answer, routing) in FAQS {
        if lowered.contains(key) {
            return format!("{answer}\n\n🔄 **Suggestion:** {routing}");
        }
    }

    // Tracking-shaped content gets an answer that already nudges toward
    // the matching feature; everything else may pick up a routing
    // suggestion from the keyword map below.
    let (answer, nudged) = if matches_any(lowered, &EMOTIONAL_RES) {
        (
            "It sounds like you might be going through something difficult. Would you like to track your mood? I can help you log how you're feeling.".to_string(),
            true,
        )
    } else if matches_any(lowered, &FOOD_RES) {
        (
            "I noticed you mentioned food. Would you like to log what you've eaten? I can help track your meals and nutrition.".to_string(),
            true,
        )
    } else if matches_any(lowered, &GLUCOSE_RES) {
        (
            "I see some numbers that look like glucose readings. Would you like to log a blood sugar reading?".to_string(),
            true,
        )
    } else if matches_any(lowered, &NEGATIVE_RES) {
        let answer = match user_name {
            Some(name) => format!(
                "No worries, {name}! I'm here to help you with your health tracking. What would you like to do today?"
            ),
            None => "That's okay! I'm here to help you track your health. What would you like to work on?".to_string(),
        };
        (answer, false)
    } else if HEALTH_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        (
            "I can help with general health information, though for specific medical advice, it's best to consult healthcare professionals.".to_string(),
            false,
        )
    } else {
        let answer = match user_name {
            Some(name) => format!(
                "I'm here to help you track your health, {name}. What would you like to do today?"
            ),
            None => "I'm your health tracking assistant. I can help you log your mood, track food, monitor glucose levels, or plan meals.".to_string(),
        };
        (answer, false)
    };

    if !nudged {
        if let Some(message) = route_suggestion(lowered) {
            return format!("{answer}\n\n🔄 **Suggestion:** {message}");
        }
        if let Some(resume) = prior.and_then(resume_suggestion) {
            return format!("{answer}\n\n🔄 **Suggestion:** {resume}");
        }
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_match_answers_with_a_suggestion() {
        let reply = handle(None, "What is a normal glucose range?", None);
        assert!(reply.contains("Normal glucose levels are typically between 80-300 mg/dL"));
        assert!(reply.contains("🔄 **Suggestion:** Would you like to log a glucose reading now?"));
    }

    #[test]
    fn emotional_expression_offers_mood_tracking() {
        let reply = handle(Some("Ananya"), "I'm so frustrated with everything", None);
        assert!(reply.contains("going through something difficult"));
        // The answer already nudges; no second suggestion is appended.
        assert!(!reply.contains("🔄 **Suggestion:**"));
    }

    #[test]
    fn insult_gets_a_personalized_deflection() {
        let reply = handle(Some("Ananya"), "you are useless", None);
        assert!(reply.starts_with("No worries, Ananya!"));

        let anon = handle(None, "this is stupid", None);
        assert!(anon.starts_with("That's okay!"));
    }

    #[test]
    fn health_question_points_to_professionals() {
        let reply = handle(None, "should I change my medicine?", None);
        assert!(reply.contains("consult healthcare professionals"));
    }

    #[test]
    fn unrelated_input_routes_from_keywords() {
        let reply = handle(None, "any good recipes?", None);
        assert!(reply.contains("I'm your health tracking assistant."));
        assert!(reply.contains("generate a personalized meal plan"));
    }

    #[test]
    fn plain_statement_gets_the_named_default() {
        let reply = handle(Some("Ananya"), "the sky is grey", None);
        assert_eq!(
            reply,
            "I'm here to help you track your health, Ananya. What would you like to do today?"
        );
    }

    #[test]
    fn prior_context_offers_a_way_back() {
        let prior = PriorContext {
            summary: "I'm feeling great today!".to_string(),
            handler: "mood_tracking".to_string(),
        };

        let reply = handle(Some("Ananya"), "the sky is grey", Some(&prior));
        assert!(reply.contains("Would you like to get back to tracking your mood?"));

        // Keyword routing outranks the resume nudge.
        let reply = handle(None, "any good recipes?", Some(&prior));
        assert!(reply.contains("generate a personalized meal plan"));
        assert!(!reply.contains("get back to tracking your mood"));
    }
}
