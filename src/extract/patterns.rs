//! Text patterns shared by the extraction heuristics
//!
//! Every helper here is a pure function over a string and returns `None`
//! (or `false`) rather than failing when the text does not fit.

use regex::Regex;
use std::sync::LazyLock;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)").expect("valid decimal regex"));

static STAR_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+\.?\d*)\s*star").expect("valid star regex"));

static REVIEW_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d[\d,.]*)\s*review").expect("valid review count regex"));

static PRICE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$+$").expect("valid price regex"));

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("valid phone regex")
});

static WEEKDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mon|tue|wed|thu|fri|sat|sun").expect("valid weekday regex"));

static REVIEW_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").expect("valid date regex"));

/// Longest text (in characters) still considered an address
const MAX_ADDRESS_CHARS: usize = 200;

/// Ratings live on a five-star scale
fn in_rating_range(value: f64) -> Option<f64> {
    (0.0..=5.0).contains(&value).then_some(value)
}

/// First decimal-or-integer token in the text, as a rating
pub fn parse_rating(text: &str) -> Option<f64> {
    let captures = DECIMAL.captures(text)?;
    captures[1].parse::<f64>().ok().and_then(in_rating_range)
}

/// Rating from an accessibility label such as "4.5 star rating"
pub fn parse_star_label(label: &str) -> Option<f64> {
    let captures = STAR_LABEL.captures(label)?;
    captures[1].parse::<f64>().ok().and_then(in_rating_range)
}

/// Count from the first "<N> review" occurrence, thousands separators removed
pub fn parse_review_count(text: &str) -> Option<u32> {
    let captures = REVIEW_COUNT.captures(text)?;
    let digits: String = captures[1].chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// True if the text is nothing but currency symbols ("$", "$$", ...)
pub fn is_price_range(text: &str) -> bool {
    PRICE_RANGE.is_match(text)
}

/// First North-American phone number in the text
pub fn find_phone(text: &str) -> Option<&str> {
    PHONE.find(text).map(|m| m.as_str())
}

/// True if the text mentions a weekday abbreviation
pub fn mentions_weekday(text: &str) -> bool {
    WEEKDAY.is_match(text)
}

/// First `M/D/YYYY` date in the text
pub fn find_review_date(text: &str) -> Option<&str> {
    REVIEW_DATE.find(text).map(|m| m.as_str())
}

/// True if the text has the rough shape of a street address
///
/// An address candidate contains a comma and a digit, is shorter than
/// 200 characters, and has at least two non-empty comma-separated segments.
pub fn looks_like_address(text: &str) -> bool {
    text.contains(',')
        && text.chars().any(|c| c.is_ascii_digit())
        && text.chars().count() < MAX_ADDRESS_CHARS
        && text.split(',').filter(|s| !s.trim().is_empty()).count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4.5"), Some(4.5));
        assert_eq!(parse_rating("4 star rating"), Some(4.0));
        assert_eq!(parse_rating("Rated 3.5 out of 5"), Some(3.5));
        assert_eq!(parse_rating("no rating yet"), None);
        assert_eq!(parse_rating("42"), None);
    }

    #[test]
    fn test_parse_star_label() {
        assert_eq!(parse_star_label("4.5 star rating"), Some(4.5));
        assert_eq!(parse_star_label("5 Stars"), Some(5.0));
        assert_eq!(parse_star_label("Photo of Tartine"), None);
    }

    #[test]
    fn test_parse_review_count() {
        assert_eq!(parse_review_count("1,234 reviews"), Some(1234));
        assert_eq!(parse_review_count("(87 Reviews)"), Some(87));
        assert_eq!(parse_review_count("4.5 (2,001 reviews)"), Some(2001));
        assert_eq!(parse_review_count("1 review"), Some(1));
        assert_eq!(parse_review_count("no reviews yet"), None);
    }

    #[test]
    fn test_is_price_range() {
        assert!(is_price_range("$"));
        assert!(is_price_range("$$$$"));
        assert!(!is_price_range("$$ - $$$"));
        assert!(!is_price_range("$10"));
        assert!(!is_price_range(""));
    }

    #[test]
    fn test_find_phone() {
        assert_eq!(find_phone("Call (415) 555-0134 now"), Some("(415) 555-0134"));
        assert_eq!(find_phone("415.555.0134"), Some("415.555.0134"));
        assert_eq!(find_phone("4155550134"), Some("4155550134"));
        assert_eq!(find_phone("555-0134"), None);
    }

    #[test]
    fn test_mentions_weekday() {
        assert!(mentions_weekday("Mon 11:00 AM - 10:00 PM"));
        assert!(mentions_weekday("SAT closed"));
        assert!(!mentions_weekday("11:00 AM - 10:00 PM"));
    }

    #[test]
    fn test_find_review_date() {
        assert_eq!(find_review_date("Updated 3/14/2024"), Some("3/14/2024"));
        assert_eq!(find_review_date("12/01/2023"), Some("12/01/2023"));
        assert_eq!(find_review_date("March 2024"), None);
    }

    #[test]
    fn test_looks_like_address() {
        assert!(looks_like_address("123 Main St, Springfield"));
        assert!(!looks_like_address("Main St, Springfield"));
        assert!(!looks_like_address("123 Main St"));
        assert!(!looks_like_address("123 Main St,"));
        let long = format!("1 {}, Springfield", "a".repeat(210));
        assert!(!looks_like_address(&long));
    }
}
