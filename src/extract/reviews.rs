//! Review extraction from listing pages

use crate::extract::patterns::{find_review_date, parse_star_label};
use crate::extract::{first_non_empty, selector, text_of, Heuristic, Review};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Review text at or below this many characters is noise, not a review
pub const MIN_REVIEW_CHARS: usize = 20;

/// Review text beyond this many characters is truncated
pub const MAX_REVIEW_CHARS: usize = 500;

const TRUNCATION_MARKER: &str = "...";
const ANONYMOUS_AUTHOR: &str = "Anonymous";

static REVIEW_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[class*="review"], li[class*="review"]"#));
static PROFILE_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[href*="/user_details"]"#));
static IMAGE_ROLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"[role="img"]"#));
static COMMENT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"p[class*="comment"], span[class*="comment"]"#));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

const TEXT_CHAIN: [Heuristic<String>; 2] = [text_from_comment, text_from_first_paragraph];

/// Extracts up to `max_reviews` reviews from a listing page
///
/// The first `max_reviews` review containers are inspected; containers whose
/// text is empty or too short to be a review are dropped, so the result can
/// hold fewer than `max_reviews` entries.
pub fn extract_reviews(document: &Html, max_reviews: usize) -> Vec<Review> {
    document
        .select(&REVIEW_CONTAINER)
        .take(max_reviews)
        .filter_map(extract_review)
        .collect()
}

fn extract_review(container: ElementRef<'_>) -> Option<Review> {
    let text = first_non_empty(container, &TEXT_CHAIN)?;
    if text.chars().count() <= MIN_REVIEW_CHARS {
        return None;
    }

    let author = container
        .select(&PROFILE_LINK)
        .next()
        .map(text_of)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string());

    let rating = container
        .select(&IMAGE_ROLE)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(parse_star_label);

    // The whole span is kept, so a label around the date stays with it
    let date = container
        .select(&SPAN)
        .map(text_of)
        .find(|text| find_review_date(text).is_some());

    Some(Review {
        author,
        rating,
        text: truncate_review(text),
        date,
    })
}

fn text_from_comment(container: ElementRef<'_>) -> Option<String> {
    container.select(&COMMENT).next().map(text_of)
}

fn text_from_first_paragraph(container: ElementRef<'_>) -> Option<String> {
    container.select(&PARAGRAPH).next().map(text_of)
}

fn truncate_review(text: String) -> String {
    if text.chars().count() <= MAX_REVIEW_CHARS {
        return text;
    }
    let mut truncated: String = text.chars().take(MAX_REVIEW_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
