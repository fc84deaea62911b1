//! Lexical extractors that pull structured values out of free text.
//!
//! Every function here is total: bad input yields `None` or a trimmed
//! passthrough, never an error. Callers decide what a missing value means.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;

/// Glucose patterns tried in order. Unit-anchored forms first, then
/// keyword-proximity forms, and finally any bare number. The bare-number
/// fallback is deliberately greedy: by the time this runs the classifier
/// has already routed the turn to glucose handling, so a lone number is
/// treated as a reading.
static GLUCOSE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+(?:\.\d+)?)\s*(?:mg/dl|mg|glucose|reading)",
        r"glucose.*?(\d+(?:\.\d+)?)",
        r"reading.*?(\d+(?:\.\d+)?)",
        r"sugar.*?(\d+(?:\.\d+)?)",
        r"(\d+(?:\.\d+)?)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid glucose regex"))
    .collect()
});

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid iso date regex"));
static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4})").expect("valid slash date regex"));
static DASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})-(\d{1,2})-(\d{4})").expect("valid dash date regex"));

static NAME_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)my name is (.+)",
        r"(?i)i am (.+)",
        r"(?i)name:?\s*(.+)",
        r"(?i)called (.+)",
        r"(?i)i'm (.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid name regex"))
    .collect()
});

const MEAL_PREFIXES: &[&str] = &[
    "i ate ",
    "i had ",
    "just ate ",
    "just had ",
    "meal:",
    "food:",
    "consumed ",
    "eaten ",
    "my meal was ",
    "for lunch i had ",
    "for dinner i had ",
    "for breakfast i had ",
];

const MOOD_PREFIXES: &[&str] = &[
    "i feel ",
    "i'm feeling ",
    "feeling ",
    "i am ",
    "mood:",
    "my mood is ",
];

/// First numeric value that looks like a glucose reading.
pub fn glucose_value(input: &str) -> Option<f64> {
    let lowered = input.to_lowercase();
    for re in GLUCOSE_RES.iter() {
        if let Some(caps) = re.captures(&lowered) {
            if let Ok(value) = caps[1].parse::<f64>() {
                return Some(value);
            }
        }
    }
    None
}

fn strip_prefix_casefold<'a>(input: &'a str, prefixes: &[&str]) -> &'a str {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();
    for prefix in prefixes {
        // Index into the original string, so only take the offset when it
        // lands on a char boundary (lowercasing can shift byte lengths).
        if lowered.starts_with(prefix) {
            if let Some(rest) = trimmed.get(prefix.len()..) {
                return rest.trim();
            }
        }
    }
    trimmed
}

/// Meal description with any leading logging phrase removed, original
/// casing preserved.
pub fn meal_description(input: &str) -> String {
    strip_prefix_casefold(input, MEAL_PREFIXES).to_string()
}

/// Mood phrase with any leading feeling phrase removed.
pub fn mood_text(input: &str) -> String {
    strip_prefix_casefold(input, MOOD_PREFIXES).to_string()
}

/// Best-effort name pulled from an introduction phrase. Falls back to the
/// whole trimmed input when no phrase matches, so a bare "Ananya Pillai"
/// still searches.
pub fn name_candidate(input: &str) -> String {
    for re in NAME_RES.iter() {
        if let Some(caps) = re.captures(input) {
            return caps[1].trim().to_string();
        }
    }
    input.trim().to_string()
}

/// Calendar date mentioned in the input, resolved against `today`.
///
/// Recognizes the relative words today/tomorrow/yesterday and three
/// numeric layouts (ISO, M/D/YYYY, M-D-YYYY). Numeric forms that name an
/// impossible date (month 13, day 40) resolve to `None`.
pub fn date_mention(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = input.to_lowercase();

    if lowered.contains("today") {
        return Some(today);
    }
    if lowered.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }
    if lowered.contains("yesterday") {
        return Some(today - Duration::days(1));
    }

    if let Some(caps) = ISO_DATE_RE.captures(&lowered) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = SLASH_DATE_RE.captures(&lowered) {
        return ymd(&caps[3], &caps[1], &caps[2]);
    }
    if let Some(caps) = DASH_DATE_RE.captures(&lowered) {
        return ymd(&caps[3], &caps[1], &caps[2]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year = year.parse().ok()?;
    let month = month.parse().ok()?;
    let day = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn glucose_prefers_unit_anchored_numbers() {
        assert_eq!(glucose_value("my glucose reading is 120"), Some(120.0));
        assert_eq!(glucose_value("95.5 mg/dl this morning"), Some(95.5));
        assert_eq!(glucose_value("sugar was around 180 after lunch"), Some(180.0));
    }

    #[test]
    fn glucose_bare_number_fallback() {
        assert_eq!(glucose_value("142"), Some(142.0));
        assert_eq!(glucose_value("it was 110 i think"), Some(110.0));
    }

    #[test]
    fn glucose_no_number_yields_none() {
        assert_eq!(glucose_value("check my levels please"), None);
        assert_eq!(glucose_value(""), None);
    }

    #[test]
    fn meal_prefixes_are_stripped_case_insensitively() {
        assert_eq!(meal_description("I ate grilled chicken with rice"), "grilled chicken with rice");
        assert_eq!(meal_description("Just had a Caesar salad"), "a Caesar salad");
        assert_eq!(meal_description("meal: oatmeal with berries"), "oatmeal with berries");
        assert_eq!(meal_description("For lunch I had sushi"), "sushi");
    }

    #[test]
    fn meal_without_prefix_passes_through_trimmed() {
        assert_eq!(meal_description("  two eggs and toast  "), "two eggs and toast");
    }

    #[test]
    fn mood_prefixes_are_stripped() {
        assert_eq!(mood_text("I feel great today"), "great today");
        assert_eq!(mood_text("I'm feeling a bit low"), "a bit low");
        assert_eq!(mood_text("mood: okay"), "okay");
    }

    #[test]
    fn name_extraction_from_introduction_phrases() {
        assert_eq!(name_candidate("My name is Ananya Pillai"), "Ananya Pillai");
        assert_eq!(name_candidate("i am Rohan"), "Rohan");
        assert_eq!(name_candidate("name: Priya Sharma"), "Priya Sharma");
        assert_eq!(name_candidate("Ananya Pillai"), "Ananya Pillai");
    }

    #[test]
    fn relative_dates_resolve_against_injected_today() {
        let today = d(2025, 3, 10);
        assert_eq!(date_mention("plan meals for today", today), Some(d(2025, 3, 10)));
        assert_eq!(date_mention("plan for tomorrow", today), Some(d(2025, 3, 11)));
        assert_eq!(date_mention("what did I eat yesterday", today), Some(d(2025, 3, 9)));
    }

    #[test]
    fn numeric_dates_normalize() {
        let today = d(2025, 3, 10);
        assert_eq!(date_mention("on 2025-04-01 please", today), Some(d(2025, 4, 1)));
        assert_eq!(date_mention("on 4/1/2025", today), Some(d(2025, 4, 1)));
        assert_eq!(date_mention("on 4-1-2025", today), Some(d(2025, 4, 1)));
    }

    #[test]
    fn absent_or_impossible_dates_yield_none() {
        let today = d(2025, 3, 10);
        assert_eq!(date_mention("plan my meals", today), None);
        assert_eq!(date_mention("on 13/40/2025", today), None);
    }
}
