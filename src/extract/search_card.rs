//! Search-results page extraction: result cards and the pagination link

use crate::extract::patterns::{parse_rating, parse_review_count};
use crate::extract::{first_non_empty, first_present, selector, text_of, Heuristic};
use crate::extract::SearchCardSummary;
use crate::url::{canonicalize_listing_url, resolve_against_origin};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Result-card containers across the known search layouts
pub static CARD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"div[data-testid="serp-ia-card"], div[data-testid="searchResultBusiness"]"#)
});

static LISTING_LINK: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="/biz/"]"#));
static IMAGE_WITH_ALT: LazyLock<Selector> = LazyLock::new(|| selector("img[alt]"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h3, h4"));
static STAR_RATING_LABEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[aria-label*="star rating"]"#));
static BOLD_RATING: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"span[data-font-weight="semibold"]"#));
static INLINE_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("span, p"));
static NEXT_PAGE: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[aria-label*="Next"]"#));

const NAME_CHAIN: [Heuristic<String>; 3] = [name_from_image_alt, name_from_anchor, name_from_heading];
const RATING_CHAIN: [Heuristic<f64>; 2] = [rating_from_star_label, rating_from_bold_value];

/// Extracts the summary of one result card
///
/// Returns `None` when the card has no listing link (ads, map widgets and
/// other non-listing cards share the container markup).
pub fn extract_search_card(card: ElementRef<'_>, origin: &Url) -> Option<SearchCardSummary> {
    let href = card
        .select(&LISTING_LINK)
        .find_map(|link| link.value().attr("href"))?;

    let business_url = match canonicalize_listing_url(href, origin) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Skipping card with unusable listing link {}: {}", href, e);
            return None;
        }
    };

    Some(SearchCardSummary {
        business_url: business_url.to_string(),
        business_name: first_non_empty(card, &NAME_CHAIN),
        rating: first_present(card, &RATING_CHAIN),
        review_count: review_count_from_inline_text(card),
    })
}

/// Extracts every listing card on a search page, in page order
pub fn extract_search_cards(document: &Html, origin: &Url) -> Vec<SearchCardSummary> {
    document
        .select(&CARD_SELECTOR)
        .filter_map(|card| extract_search_card(card, origin))
        .collect()
}

/// Finds the "next page" link of a search page, if any
pub fn find_next_page(document: &Html, origin: &Url) -> Option<Url> {
    let href = document
        .select(&NEXT_PAGE)
        .find_map(|link| link.value().attr("href"))?;

    resolve_against_origin(href, origin).ok()
}

fn name_from_image_alt(card: ElementRef<'_>) -> Option<String> {
    card.select(&IMAGE_WITH_ALT)
        .next()
        .and_then(|img| img.value().attr("alt"))
        .map(str::to_string)
}

fn name_from_anchor(card: ElementRef<'_>) -> Option<String> {
    card.select(&LISTING_LINK).next().map(text_of)
}

fn name_from_heading(card: ElementRef<'_>) -> Option<String> {
    card.select(&HEADING).next().map(text_of)
}

fn rating_from_star_label(card: ElementRef<'_>) -> Option<f64> {
    card.select(&STAR_RATING_LABEL)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .and_then(parse_rating)
}

fn rating_from_bold_value(card: ElementRef<'_>) -> Option<f64> {
    card.select(&BOLD_RATING)
        .next()
        .map(text_of)
        .and_then(|text| parse_rating(&text))
}

fn review_count_from_inline_text(card: ElementRef<'_>) -> Option<u32> {
    card.select(&INLINE_TEXT)
        .map(text_of)
        .find(|text| text.to_lowercase().contains("review"))
        .and_then(|text| parse_review_count(&text))
}
