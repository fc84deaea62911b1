//! Login utterance detection.
//!
//! An unauthenticated turn is either an ID attempt, a name search, or
//! neither. ID detection runs first: "1042" must never be treated as a
//! name even though the name fallback would accept it.

use std::sync::LazyLock;

use regex::Regex;

static SHORT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid short id regex"));
static HEX_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9-]{8,}$").expect("valid hex id regex"));
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid uuid regex")
});

const NAME_SEARCH_PHRASES: &[&str] = &["my name is", "i am", "name:", "called", "i'm"];

/// Whether the trimmed input looks like a bare user ID: a 4-digit code, a
/// canonical UUID, or any hex-and-dashes token of 8+ characters.
pub fn looks_like_user_id(input: &str) -> bool {
    let token = input.trim().to_lowercase();
    SHORT_ID_RE.is_match(&token) || UUID_RE.is_match(&token) || HEX_ID_RE.is_match(&token)
}

/// Whether the input carries an introduction phrase worth a name lookup.
pub fn looks_like_name_search(input: &str) -> bool {
    let lowered = input.to_lowercase();
    NAME_SEARCH_PHRASES.iter().any(|p| lowered.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_digit_codes_are_ids() {
        assert!(looks_like_user_id("1042"));
        assert!(looks_like_user_id("  0007  "));
        assert!(!looks_like_user_id("104"));
        assert!(!looks_like_user_id("10425"));
    }

    #[test]
    fn uuids_and_hex_tokens_are_ids() {
        assert!(looks_like_user_id("0195f9a2-7b1c-7e8d-9f00-1234567890ab"));
        assert!(looks_like_user_id("DEADBEEF"));
        assert!(looks_like_user_id("a1b2-c3d4"));
        assert!(!looks_like_user_id("deadbee"));
        assert!(!looks_like_user_id("not-a-hex-id"));
    }

    #[test]
    fn introduction_phrases_trigger_name_search() {
        assert!(looks_like_name_search("My name is Ananya Pillai"));
        assert!(looks_like_name_search("i'm Rohan"));
        assert!(looks_like_name_search("name: Priya"));
        assert!(!looks_like_name_search("hello there"));
    }

    #[test]
    fn id_detection_is_not_fooled_by_phrases() {
        // "i am 1042" is a name-search phrase, not a bare token.
        assert!(!looks_like_user_id("i am 1042"));
        assert!(looks_like_name_search("i am 1042"));
    }
}
