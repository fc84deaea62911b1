//! Keyword-scored intent classification.
//!
//! One table-driven module owns every routing heuristic; the weight tables
//! below are the single source of truth for what each category matches.
//! Matching is substring containment on the lowercased input, not
//! word-boundary matching. Overlapping substrings are part of the contract
//! ("feeling" also hits "feel", and tests pin that behavior).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The classified purpose of a user utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MoodTracking,
    CgmMonitoring,
    FoodLogging,
    MealPlanning,
    InsightsRequest,
    GeneralQuestion,
    /// Unauthenticated turn resolved as an ID login attempt.
    Authentication,
    /// Unauthenticated turn resolved as a name lookup.
    NameSearch,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::MoodTracking => "mood_tracking",
            Intent::CgmMonitoring => "cgm_monitoring",
            Intent::FoodLogging => "food_logging",
            Intent::MealPlanning => "meal_planning",
            Intent::InsightsRequest => "insights_request",
            Intent::GeneralQuestion => "general_question",
            Intent::Authentication => "authentication",
            Intent::NameSearch => "name_search",
        }
    }
}

// Mood weight tables.
const MOOD_DIRECT: &[&str] = &["feel", "mood", "feeling", "emotions", "emotional"];
const MOOD_POSITIVE: &[&str] = &[
    "happy", "great", "awesome", "fantastic", "wonderful", "excited", "thrilled", "amazing",
    "good", "better", "cheerful", "joyful", "elated", "ecstatic",
];
const MOOD_NEGATIVE: &[&str] = &[
    "sad", "terrible", "awful", "horrible", "bad", "worse", "depressed", "down", "low", "upset",
    "angry", "frustrated", "stressed", "anxious", "worried", "scared", "tired", "exhausted",
    "drained",
];
const MOOD_SELF_REF: &[&str] = &[
    "i am", "i'm", "i feel", "i'm feeling", "feeling", "today i", "right now i",
];

// Glucose weight tables.
const CGM_DIRECT: &[&str] = &[
    "glucose", "blood sugar", "cgm", "reading", "mg/dl", "sugar level", "diabetes", "diabetic",
];
const CGM_ACTIONS: &[&str] = &["check", "test", "measure", "monitor"];

// Food weight tables.
const FOOD_PAST_TENSE: &[&str] = &["ate", "had", "eaten", "consumed", "finished", "devoured"];
const FOOD_PRESENT_TENSE: &[&str] = &["eating", "having", "consuming"];
const FOOD_MEALS: &[&str] = &["breakfast", "lunch", "dinner", "snack", "meal", "brunch", "supper"];
const FOOD_ITEMS: &[&str] = &[
    "food", "pizza", "salad", "chicken", "rice", "bread", "fruit", "vegetables",
];
const FOOD_CONTEXT: &[&str] = &[
    "just", "recently", "earlier", "this morning", "for lunch", "for dinner",
];

// Meal-planning weight tables.
const PLANNING_DIRECT: &[&str] = &[
    "meal plan", "plan meal", "plan a meal", "meal planning", "menu", "meal ideas",
    "suggest meals", "what to eat", "plan my meals",
];
const PLANNING_VERBS: &[&str] = &["plan", "planning", "suggest", "recommend", "generate", "create"];
const PLANNING_QUESTIONS: &[&str] = &[
    "what should i eat", "what can i eat", "meal suggestions", "food recommendations",
];
const PLANNING_TIME_BASED: &[&str] = &["tomorrow", "today", "this week", "next week", "meal prep"];
const PLANNING_MEAL_NOUNS: &[&str] = &["meal", "menu", "food", "diet"];

// Insights weight tables.
const INSIGHTS_DIRECT: &[&str] = &[
    "trends", "insights", "show me", "view", "display", "analysis", "patterns", "summary",
    "report", "data", "statistics", "dashboard",
];
const INSIGHTS_REQUESTS: &[&str] = &[
    "how am i doing", "my progress", "track my", "history", "overview", "my health",
    "health dashboard",
];
const INSIGHTS_DISPLAY_VERBS: &[&str] = &["show", "view", "display", "get"];

static CGM_VALUE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\d+\s*(?:mg|glucose|sugar|reading)",
        r"glucose.*\d+",
        r"sugar.*\d+",
        r"reading.*\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid glucose value regex"))
    .collect()
});

static SELF_DEPRECATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"i'?m\s+(stupid|dumb|worthless|useless|terrible|awful|pathetic)")
        .expect("valid self-deprecating regex")
});
static FEEL_LIKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"i\s+feel\s+like").expect("valid feel-like regex"));
static INTENSIFIED_SELF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"i'?m\s+(so|really|very|extremely)\s+\w+").expect("valid intensified-self regex")
});

fn hits(input: &str, words: &[&str]) -> u32 {
    words.iter().filter(|w| input.contains(*w)).count() as u32
}

fn any(input: &str, words: &[&str]) -> bool {
    words.iter().any(|w| input.contains(*w))
}

fn mood_score(input: &str) -> u32 {
    let mut score = 0;
    score += 2 * hits(input, MOOD_DIRECT);
    score += 2 * hits(input, MOOD_POSITIVE);
    score += 2 * hits(input, MOOD_NEGATIVE);
    // Self-referential statements are strong mood signals.
    score += 3 * hits(input, MOOD_SELF_REF);
    if SELF_DEPRECATING_RE.is_match(input) {
        score += 5;
    }
    if FEEL_LIKE_RE.is_match(input) {
        score += 4;
    }
    if INTENSIFIED_SELF_RE.is_match(input) {
        score += 3;
    }
    score
}

fn cgm_score(input: &str) -> u32 {
    2 * hits(input, CGM_DIRECT) + hits(input, CGM_ACTIONS)
}

fn food_score(input: &str) -> u32 {
    let mut score = 0;
    score += 3 * hits(input, FOOD_PAST_TENSE);
    score += 2 * hits(input, FOOD_PRESENT_TENSE);
    score += hits(input, FOOD_ITEMS);
    score += hits(input, FOOD_CONTEXT);

    // Meal words only count when logging context dominates; "plan dinner"
    // must not look like food logging.
    let has_logging_context = any(input, FOOD_PAST_TENSE) || any(input, FOOD_CONTEXT);
    let has_planning_context = any(input, PLANNING_VERBS);

    if !has_planning_context && has_logging_context {
        score += 2 * hits(input, FOOD_MEALS);
    } else if !has_planning_context {
        score += hits(input, FOOD_MEALS);
    }
    score
}

fn planning_score(input: &str) -> u32 {
    let mut score = 0;
    score += 4 * hits(input, PLANNING_DIRECT);
    score += 2 * hits(input, PLANNING_QUESTIONS);
    score += hits(input, PLANNING_TIME_BASED);

    let verbs_present = any(input, PLANNING_VERBS);
    let meal_nouns_present = any(input, PLANNING_MEAL_NOUNS);
    if verbs_present && meal_nouns_present {
        score += 5;
    } else if verbs_present {
        score += 2;
    }
    score
}

fn insights_score(input: &str) -> u32 {
    let mut score = 0;
    score += 2 * hits(input, INSIGHTS_DIRECT);
    score += 2 * hits(input, INSIGHTS_REQUESTS);
    if any(input, INSIGHTS_DISPLAY_VERBS) {
        score += 5;
    }
    score
}

/// Classify an authenticated-session utterance into exactly one intent.
///
/// A numeric glucose pattern short-circuits everything else. Otherwise the
/// five category scores compete; a strictly highest score wins, all-zero
/// falls through to `GeneralQuestion`, and nonzero ties resolve in
/// evaluation order (mood, glucose, food, meal-planning, insights).
pub fn classify(input: &str) -> Intent {
    let input = input.to_lowercase();
    let input = input.trim();

    if CGM_VALUE_RES.iter().any(|re| re.is_match(input)) {
        return Intent::CgmMonitoring;
    }

    // Evaluation order doubles as the tie-break order.
    let scores = [
        (Intent::MoodTracking, mood_score(input)),
        (Intent::CgmMonitoring, cgm_score(input)),
        (Intent::FoodLogging, food_score(input)),
        (Intent::MealPlanning, planning_score(input)),
        (Intent::InsightsRequest, insights_score(input)),
    ];

    let mut best = (Intent::GeneralQuestion, 0u32);
    for (intent, score) in scores {
        if score > best.1 {
            best = (intent, score);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_glucose_pattern_short_circuits() {
        // Even with mood and food keywords present, a `\d+ mg` pattern wins.
        assert_eq!(classify("feeling great but 95 mg after pizza"), Intent::CgmMonitoring);
        assert_eq!(classify("125 mg/dl"), Intent::CgmMonitoring);
        assert_eq!(classify("my glucose reading is 120"), Intent::CgmMonitoring);
        assert_eq!(classify("blood sugar was 140 after lunch"), Intent::CgmMonitoring);
    }

    #[test]
    fn mood_statements_classify_as_mood_tracking() {
        assert_eq!(classify("I'm feeling really great today!"), Intent::MoodTracking);
        assert_eq!(classify("I feel terrible"), Intent::MoodTracking);
        assert_eq!(classify("i'm stupid"), Intent::MoodTracking);
        assert_eq!(classify("I feel like nothing matters"), Intent::MoodTracking);
    }

    #[test]
    fn food_logging_statements() {
        assert_eq!(classify("I ate grilled chicken with rice"), Intent::FoodLogging);
        assert_eq!(classify("just had a salad for lunch"), Intent::FoodLogging);
    }

    #[test]
    fn planning_beats_food_when_planning_verbs_present() {
        assert_eq!(classify("generate a meal plan for tomorrow"), Intent::MealPlanning);
        assert_eq!(classify("plan dinner for me"), Intent::MealPlanning);
        assert_eq!(classify("what should i eat this week"), Intent::MealPlanning);
    }

    #[test]
    fn insights_requests() {
        assert_eq!(classify("show me my mood trends"), Intent::InsightsRequest);
        assert_eq!(classify("display my health dashboard"), Intent::InsightsRequest);
    }

    #[test]
    fn glucose_keywords_without_numbers() {
        assert_eq!(classify("i want to check my blood sugar"), Intent::CgmMonitoring);
    }

    #[test]
    fn zero_scores_fall_through_to_general_question() {
        assert_eq!(classify("what is the capital of France?"), Intent::GeneralQuestion);
        assert_eq!(classify("hello there"), Intent::GeneralQuestion);
    }

    #[test]
    fn nonzero_ties_resolve_in_evaluation_order() {
        // "check" alone: +1 glucose action, nothing else. Glucose wins at 1.
        assert_eq!(classify("check"), Intent::CgmMonitoring);
    }

    #[test]
    fn weight_tables_score_as_specified() {
        // "I'm feeling really great today!": direct "feel" + "feeling" (+4),
        // positive "great" (+2), self-ref "i'm" + "i'm feeling" + "feeling"
        // (+9). No intensity regex match because "really" follows "feeling",
        // not "i'm".
        assert_eq!(mood_score("i'm feeling really great today!"), 15);
        // Past-tense verb (+3), food item (+1).
        assert_eq!(food_score("i ate chicken"), 4);
        // Direct phrase "meal plan" (+4), verb+noun bonus (+5), verb "plan"
        // inside "meal plan" counts once via the bonus path only.
        assert_eq!(planning_score("meal plan"), 9);
    }
}
