//! Mood label normalization and scoring.
//!
//! Free text collapses to one of a fixed set of labels, each label maps to
//! a 1..=10 score, and the score maps to a human interpretation band. The
//! negative tiers are checked before the positive ones so "not good" never
//! reads as "good".

/// A normalized mood with its score and interpretation band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodReading {
    pub label: &'static str,
    pub score: u8,
    pub interpretation: &'static str,
}

const TERRIBLE_WORDS: &[&str] = &["terrible", "awful", "horrible", "worst"];
const DEPRESSED_WORDS: &[&str] = &["very sad", "depressed", "miserable", "devastated"];
const SAD_WORDS: &[&str] = &["sad", "down", "low", "blue", "upset"];
const TIRED_WORDS: &[&str] = &["tired", "sluggish", "drained", "exhausted", "weary"];
const BAD_WORDS: &[&str] = &["bad", "not good", "poor", "rough"];
const ECSTATIC_WORDS: &[&str] = &["ecstatic", "overjoyed", "blissful", "euphoric", "elated"];
const EXCITED_WORDS: &[&str] = &["excited", "amazing", "thrilled", "energetic", "pumped"];
const GREAT_WORDS: &[&str] = &["great", "wonderful", "fantastic", "awesome", "excellent"];
const HAPPY_WORDS: &[&str] = &["happy", "positive", "cheerful", "content", "joyful"];
const GOOD_WORDS: &[&str] = &["good", "decent", "alright", "better", "well"];
const OKAY_WORDS: &[&str] = &["okay", "fine", "meh", "so-so"];

const TONE_POSITIVE: &[&str] = &["love", "like", "enjoy", "nice", "pleasant", "bright"];
const TONE_NEGATIVE: &[&str] = &["hate", "dislike", "stress", "worry", "angry", "frustrated"];

fn contains_any(input: &str, words: &[&str]) -> bool {
    words.iter().any(|w| input.contains(w))
}

/// Collapse free text to a canonical mood label.
///
/// Tiers run negative-first, each from more to less specific. Text matching
/// no tier is judged by tone word counts and lands on "good", "down" or
/// "neutral".
pub fn extract_label(input: &str) -> &'static str {
    let lowered = input.to_lowercase();
    let input = lowered.trim();

    if contains_any(input, TERRIBLE_WORDS) {
        "terrible"
    } else if contains_any(input, DEPRESSED_WORDS) {
        "depressed"
    } else if contains_any(input, SAD_WORDS) {
        "sad"
    } else if contains_any(input, TIRED_WORDS) {
        "tired"
    } else if contains_any(input, BAD_WORDS) {
        "bad"
    } else if contains_any(input, ECSTATIC_WORDS) {
        "ecstatic"
    } else if contains_any(input, EXCITED_WORDS) {
        "excited"
    } else if contains_any(input, GREAT_WORDS) {
        "great"
    } else if contains_any(input, HAPPY_WORDS) {
        "happy"
    } else if contains_any(input, GOOD_WORDS) {
        "good"
    } else if contains_any(input, OKAY_WORDS) {
        "okay"
    } else {
        let pos = TONE_POSITIVE.iter().filter(|w| input.contains(*w)).count();
        let neg = TONE_NEGATIVE.iter().filter(|w| input.contains(*w)).count();
        if pos > neg {
            "good"
        } else if neg > pos {
            "down"
        } else {
            "neutral"
        }
    }
}

fn direct_score(label: &str) -> Option<u8> {
    let score = match label {
        "terrible" | "awful" | "horrible" => 1,
        "depressed" | "miserable" => 2,
        "sad" | "down" | "low" => 3,
        "tired" | "bad" => 4,
        "okay" | "neutral" | "fine" => 5,
        "good" | "decent" | "alright" => 6,
        "happy" | "positive" | "cheerful" => 7,
        "great" | "wonderful" | "fantastic" => 8,
        "excited" | "amazing" | "thrilled" => 9,
        "ecstatic" | "overjoyed" | "blissful" => 10,
        _ => return None,
    };
    Some(score)
}

/// Score a mood label on the 1..=10 scale. Exact table match first, then
/// tiered substring fallback, then the neutral 5.
pub fn score_for_label(label: &str) -> u8 {
    let lowered = label.to_lowercase();
    let label = lowered.trim();

    if let Some(score) = direct_score(label) {
        return score;
    }

    if contains_any(label, TERRIBLE_WORDS) {
        1
    } else if contains_any(label, DEPRESSED_WORDS) {
        2
    } else if contains_any(label, SAD_WORDS) {
        3
    } else if contains_any(label, TIRED_WORDS) {
        4
    } else if contains_any(label, GOOD_WORDS) {
        6
    } else if contains_any(label, HAPPY_WORDS) {
        7
    } else if contains_any(label, GREAT_WORDS) {
        8
    } else if contains_any(label, EXCITED_WORDS) {
        9
    } else if contains_any(label, ECSTATIC_WORDS) {
        10
    } else {
        5
    }
}

pub fn interpretation(score: u8) -> &'static str {
    match score {
        0..=2 => "Very Low - Consider reaching out for support",
        3..=4 => "Low - Self-care and rest may help",
        5 => "Neutral - A typical day",
        6..=7 => "Good - Positive and stable",
        8..=9 => "High - Feeling great!",
        _ => "Very High - Excellent mood!",
    }
}

/// Full assessment of raw mood text.
pub fn assess(input: &str) -> MoodReading {
    let label = extract_label(input);
    let score = score_for_label(label);
    MoodReading {
        label,
        score,
        interpretation: interpretation(score),
    }
}

/// Suggestion text keyed on the fresh score and the 7-day rolling average.
/// `rolling_avg` is `None` when there is no history yet.
pub fn recommendation(score: u8, rolling_avg: Option<f64>) -> &'static str {
    let avg = rolling_avg.unwrap_or(0.0);
    if score <= 3 {
        if avg > 0.0 && f64::from(score) < avg - 2.0 {
            "Consider reaching out to a friend or family member. Your mood has been lower than usual."
        } else {
            "Try some gentle self-care activities like deep breathing or a warm bath."
        }
    } else if score <= 5 {
        if avg > 0.0 && f64::from(score) < avg - 1.0 {
            "A short walk or listening to your favorite music might help lift your spirits."
        } else {
            "Consider activities that bring you joy, even small ones."
        }
    } else if score >= 8 {
        "Great energy! Consider channeling this positive mood into productive activities."
    } else {
        "You're doing well! Keep up the positive momentum."
    }
}
