//! Listing-page extraction
//!
//! Each field is read by an independent heuristic over the whole document
//! rather than from one semantic node.

use crate::extract::patterns::{
    find_phone, is_price_range, looks_like_address, mentions_weekday, parse_review_count,
    parse_star_label,
};
use crate::extract::{selector, spaced_text_of, text_of, BusinessDetail};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Upper bound on photos kept per listing
pub const MAX_PHOTOS: usize = 10;

/// Marker carried by links that filter search results by category
const CATEGORY_FILTER_MARKER: &str = "cflt=";

/// Path marker of the site's business-photo CDN
const PHOTO_CDN_MARKER: &str = "bphoto";

static HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static IMAGE_ROLE_LABEL: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[role="img"][aria-label]"#));
static CATEGORY_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector(&format!(r#"a[href*="{}"]"#, CATEGORY_FILTER_MARKER)));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static BLOCK_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("p, div, span"));
static PHONE_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("p, div, span, a"));
static HOURS_ROW: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"tbody tr, div[class*="hours"] p, div[class*="businessHours"] p"#)
});
static PHOTO: LazyLock<Selector> =
    LazyLock::new(|| selector(&format!(r#"img[src*="{}"]"#, PHOTO_CDN_MARKER)));

/// Extracts every listing attribute from a rendered listing page
///
/// Never fails: a field whose markup is missing takes its absent value
/// (`None`, `0`, an empty name or an empty photo list).
pub fn extract_business_detail(document: &Html, url: &Url) -> BusinessDetail {
    BusinessDetail {
        business_name: business_name(document),
        rating: star_rating(document),
        review_count: review_count(document),
        categories: categories(document),
        price_range: price_range(document),
        address: address(document),
        phone: phone(document),
        hours: hours(document),
        photos: photos(document),
        url: url.to_string(),
    }
}

fn business_name(document: &Html) -> String {
    document
        .select(&HEADING)
        .next()
        .map(text_of)
        .unwrap_or_default()
}

fn star_rating(document: &Html) -> Option<f64> {
    document
        .select(&IMAGE_ROLE_LABEL)
        .filter_map(|el| el.value().attr("aria-label"))
        .find(|label| label.to_lowercase().contains("star"))
        .and_then(parse_star_label)
}

/// First "N reviews" in the visible body; head and title text is skipped
fn review_count(document: &Html) -> u32 {
    document
        .select(&BODY)
        .next()
        .and_then(|body| parse_review_count(&spaced_text_of(body)))
        .unwrap_or(0)
}

fn categories(document: &Html) -> Option<Vec<String>> {
    let mut found: Vec<String> = Vec::new();

    for link in document.select(&CATEGORY_LINK) {
        let name = text_of(link);
        if !name.is_empty() && !found.contains(&name) {
            found.push(name);
        }
    }

    (!found.is_empty()).then_some(found)
}

fn price_range(document: &Html) -> Option<String> {
    document
        .select(&SPAN)
        .map(text_of)
        .find(|text| is_price_range(text))
}

/// Picks the shortest address-shaped text on the page
///
/// Longer candidates are usually surrounding prose that happens to contain
/// the address, so the shortest plausible one is kept. Ties go to the
/// earliest candidate.
fn address(document: &Html) -> Option<String> {
    document
        .select(&BLOCK_TEXT)
        .map(text_of)
        .filter(|text| looks_like_address(text))
        .min_by_key(|text| text.chars().count())
}

fn phone(document: &Html) -> Option<String> {
    document
        .select(&PHONE_TEXT)
        .find_map(|el| find_phone(&text_of(el)).map(str::to_string))
}

fn hours(document: &Html) -> Option<Vec<String>> {
    let rows: Vec<String> = document
        .select(&HOURS_ROW)
        .map(spaced_text_of)
        .filter(|text| !text.is_empty() && mentions_weekday(text))
        .collect();

    (!rows.is_empty()).then_some(rows)
}

fn photos(document: &Html) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for src in document
        .select(&PHOTO)
        .filter_map(|img| img.value().attr("src"))
    {
        if found.len() >= MAX_PHOTOS {
            break;
        }
        if !found.iter().any(|seen| seen == src) {
            found.push(src.to_string());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://www.yelp.com/biz/golden-boy-pizza-san-francisco").unwrap()
    }

    fn detail(body: &str) -> BusinessDetail {
        let document = Html::parse_document(&format!("<html><body>{}</body></html>", body));
        extract_business_detail(&document, &url())
    }

    #[test]
    fn test_full_listing() {
        let result = detail(
            r#"
            <h1> Golden Boy Pizza </h1>
            <div role="img" aria-label="4.5 star rating"></div>
            <a href="/biz/golden-boy-pizza-san-francisco/reviews">2,315 reviews</a>
            <span>$</span>
            <a href="/search?cflt=pizza&find_loc=SF">Pizza</a>
            <a href="/search?cflt=bars&find_loc=SF">Bars</a>
            <a href="/search?cflt=pizza&find_loc=SF">Pizza</a>
            <p>542 Green St, San Francisco, CA 94133</p>
            <p>(415) 982-9738</p>
            <table><tbody>
              <tr><th>Mon</th><td>11:30 AM - 11:30 PM</td></tr>
              <tr><th>Tue</th><td>11:30 AM - 11:30 PM</td></tr>
            </tbody></table>
            <img src="https://s3-media0.fl.yelpcdn.com/bphoto/a1/o.jpg">
            <img src="https://s3-media0.fl.yelpcdn.com/bphoto/a1/o.jpg">
            <img src="https://s3-media0.fl.yelpcdn.com/bphoto/b2/o.jpg">
            <img src="https://s3-media0.fl.yelpcdn.com/assets/logo.png">
            "#,
        );

        assert_eq!(result.business_name, "Golden Boy Pizza");
        assert_eq!(result.rating, Some(4.5));
        assert_eq!(result.review_count, 2315);
        assert_eq!(
            result.categories,
            Some(vec!["Pizza".to_string(), "Bars".to_string()])
        );
        assert_eq!(result.price_range.as_deref(), Some("$"));
        assert_eq!(
            result.address.as_deref(),
            Some("542 Green St, San Francisco, CA 94133")
        );
        assert_eq!(result.phone.as_deref(), Some("(415) 982-9738"));
        assert_eq!(
            result.hours,
            Some(vec![
                "Mon 11:30 AM - 11:30 PM".to_string(),
                "Tue 11:30 AM - 11:30 PM".to_string(),
            ])
        );
        assert_eq!(result.photos.len(), 2);
        assert_eq!(result.url, url().to_string());
    }

    #[test]
    fn test_empty_page_uses_absent_values() {
        let result = detail("");
        assert_eq!(result.business_name, "");
        assert_eq!(result.rating, None);
        assert_eq!(result.review_count, 0);
        assert_eq!(result.categories, None);
        assert_eq!(result.price_range, None);
        assert_eq!(result.address, None);
        assert_eq!(result.phone, None);
        assert_eq!(result.hours, None);
        assert!(result.photos.is_empty());
    }

    #[test]
    fn test_review_count_ignores_head() {
        let document = Html::parse_document(
            r#"<html><head><title>Golden Boy Pizza - 999 reviews</title>
            <script>window.meta = "12 reviews";</script></head>
            <body><h1>Golden Boy Pizza</h1><span>87 reviews</span></body></html>"#,
        );
        let result = extract_business_detail(&document, &url());
        assert_eq!(result.review_count, 87);
    }

    #[test]
    fn test_no_star_label_means_no_rating() {
        let result = detail(
            r#"<h1>Quiet Place</h1><div role="img" aria-label="Photo of the dining room"></div><span>Great food</span>"#,
        );
        assert_eq!(result.rating, None);
        assert_eq!(result.business_name, "Quiet Place");
    }

    #[test]
    fn test_shortest_address_wins() {
        let result = detail(
            r#"<p>Located near 123 Main St, Springfield, in the downtown district</p>
               <p>123 Main St, Springfield</p>"#,
        );
        assert_eq!(result.address.as_deref(), Some("123 Main St, Springfield"));
    }

    #[test]
    fn test_photos_capped_at_ten() {
        let imgs: String = (0..25)
            .map(|i| format!(r#"<img src="https://cdn.example.com/bphoto/{}/l.jpg">"#, i))
            .collect();
        let result = detail(&imgs);
        assert_eq!(result.photos.len(), MAX_PHOTOS);
        assert_eq!(result.photos[0], "https://cdn.example.com/bphoto/0/l.jpg");
        assert_eq!(result.photos[9], "https://cdn.example.com/bphoto/9/l.jpg");
    }

    #[test]
    fn test_hours_from_labeled_container() {
        let result = detail(
            r#"<div class="businessHours__09f24"><p>Wed 9:00 AM - 5:00 PM</p><p>Closed for holidays</p></div>"#,
        );
        assert_eq!(result.hours, Some(vec!["Wed 9:00 AM - 5:00 PM".to_string()]));
    }

    #[test]
    fn test_price_must_be_only_symbols() {
        let result = detail("<span>$$ - $$$</span><span>$$</span>");
        assert_eq!(result.price_range.as_deref(), Some("$$"));
    }

    #[test]
    fn test_first_phone_wins() {
        let result = detail("<span>Call 415-555-0101</span><a href='tel:4155550199'>415-555-0199</a>");
        assert_eq!(result.phone.as_deref(), Some("415-555-0101"));
    }
}
