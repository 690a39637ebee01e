//! Extraction layer: pure functions from a parsed page to structured records
//!
//! The target site's markup changes between layout variants, so each field is
//! resolved by its own best-effort heuristic. Fields with several possible
//! sources use an ordered chain of heuristics where the first non-empty
//! result wins. Nothing in here performs I/O or fails on missing markup:
//! every field has a defined absent value.

mod detail;
pub mod patterns;
mod reviews;
mod search_card;
mod types;

pub use detail::extract_business_detail;
pub use reviews::{extract_reviews, MAX_REVIEW_CHARS, MIN_REVIEW_CHARS};
pub use search_card::{extract_search_card, extract_search_cards, find_next_page, CARD_SELECTOR};
pub use types::{BusinessDetail, Review, SearchCardSummary};

use scraper::{ElementRef, Selector};

/// A single way of reading one field from an element
pub type Heuristic<T> = fn(ElementRef<'_>) -> Option<T>;

/// Runs the heuristics in order and returns the first non-empty trimmed string
pub fn first_non_empty(element: ElementRef<'_>, chain: &[Heuristic<String>]) -> Option<String> {
    chain
        .iter()
        .filter_map(|heuristic| heuristic(element))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Runs the heuristics in order and returns the first value produced
pub fn first_present<T>(element: ElementRef<'_>, chain: &[Heuristic<T>]) -> Option<T> {
    chain.iter().find_map(|heuristic| heuristic(element))
}

/// Parses a selector that is known to be valid at compile time
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Text content of an element with whitespace runs collapsed
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text content with a space between adjacent text nodes
///
/// Table rows and whole-page scans read better this way: `<th>Mon</th><td>9-5</td>`
/// becomes "Mon 9-5" rather than "Mon9-5".
pub(crate) fn spaced_text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn alt_text(element: ElementRef<'_>) -> Option<String> {
        element.value().attr("alt").map(str::to_string)
    }

    fn title_text(element: ElementRef<'_>) -> Option<String> {
        element.value().attr("title").map(str::to_string)
    }

    fn body_text(element: ElementRef<'_>) -> Option<String> {
        Some(text_of(element))
    }

    fn first_div(html: &Html) -> ElementRef<'_> {
        html.select(&selector("div")).next().unwrap()
    }

    #[test]
    fn test_first_non_empty_skips_blank_values() {
        let html = Html::parse_fragment(r#"<div alt="   " title="Tartine">Bakery</div>"#);
        let value = first_non_empty(first_div(&html), &[alt_text, title_text, body_text]);
        assert_eq!(value.as_deref(), Some("Tartine"));
    }

    #[test]
    fn test_first_non_empty_all_missing() {
        let html = Html::parse_fragment(r#"<div>   </div>"#);
        let value = first_non_empty(first_div(&html), &[alt_text, title_text, body_text]);
        assert_eq!(value, None);
    }

    #[test]
    fn test_first_present_order() {
        let html = Html::parse_fragment(r#"<div alt="a" title="b"></div>"#);
        let value = first_present(first_div(&html), &[title_text, alt_text]);
        assert_eq!(value.as_deref(), Some("b"));
    }

    #[test]
    fn test_text_helpers() {
        let html = Html::parse_fragment("<div><b>Mon</b><i>9 AM -\n  5 PM</i></div>");
        assert_eq!(text_of(first_div(&html)), "Mon9 AM - 5 PM");
        assert_eq!(spaced_text_of(first_div(&html)), "Mon 9 AM - 5 PM");
    }
}
