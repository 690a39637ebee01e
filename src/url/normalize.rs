use crate::UrlError;
use url::Url;

/// Canonicalizes a listing link into the form used as the dedup key
///
/// # Canonicalization Steps
///
/// 1. Resolve the href against the site origin (absolute hrefs are kept as-is)
/// 2. Reject anything that is not HTTP(S) or has no host
/// 3. Remove the query string
/// 4. Remove the fragment
///
/// Applying this to an already canonical URL is a no-op.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value (relative or absolute)
/// * `origin` - The site origin relative links resolve against
///
/// # Examples
///
/// ```
/// use listing_ripple::url::canonicalize_listing_url;
/// use url::Url;
///
/// let origin = Url::parse("https://www.yelp.com").unwrap();
/// let url = canonicalize_listing_url("/biz/joes-pizza?osq=pizza", &origin).unwrap();
/// assert_eq!(url.as_str(), "https://www.yelp.com/biz/joes-pizza");
/// ```
pub fn canonicalize_listing_url(href: &str, origin: &Url) -> Result<Url, UrlError> {
    let mut url = resolve_against_origin(href, origin)?;

    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Resolves an href against the site origin, keeping its query string
///
/// Used for pagination links, whose query string carries the result offset.
pub fn resolve_against_origin(href: &str, origin: &Url) -> Result<Url, UrlError> {
    let href = href.trim();

    if href.is_empty() {
        return Err(UrlError::Parse("empty href".to_string()));
    }

    let url = origin
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}
