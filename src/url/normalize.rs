use crate::UrlError;
use url::Url;

/// Normalizes an absolute URL into its crawl identity
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Accept only `http` and `https`
/// 3. Require a host (lowercased by the parser, default port dropped)
/// 4. Resolve dot segments in the path (done by the parser)
/// 5. Remove the query string and fragment
///
/// The `www.` prefix is kept: host matching against the allowed domain is exact.
///
/// # Examples
///
/// ```
/// use headline_harvest::url::normalize_url;
///
/// let url = normalize_url("https://WWW.Example.com:443/a/../news/?page=2#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/news/");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    strip_to_identity(url)
}

/// Resolves an href against the page it appeared on, then normalizes it
///
/// # Examples
///
/// ```
/// use headline_harvest::url::resolve_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.example.com/markets/overview").unwrap();
/// let url = resolve_url("../companies/news?ref=nav", &base).unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/companies/news");
/// ```
pub fn resolve_url(href: &str, base: &Url) -> Result<Url, UrlError> {
    let url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    strip_to_identity(url)
}

fn strip_to_identity(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    url.set_query(None);

    Ok(url)
}
