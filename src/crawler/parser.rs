//! HTML parser for extracting links from navigation pages
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a href>` tags), resolved against the page URL
//! - Page title, for logging

use crate::url::resolve_url;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Links found on the page, absolute and normalized, in document order
    pub links: Vec<Url>,
}

/// Parses HTML content and extracts links and title
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links (same page anchors)
/// - Anything that does not resolve to an http(s) URL
///
/// Query strings and fragments are stripped from every link.
///
/// # Example
///
/// ```
/// use headline_harvest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Home</title></head><body><a href="/markets">Markets</a></body></html>"#;
/// let base_url = Url::parse("https://www.example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Home".to_string()));
/// assert_eq!(parsed.links[0].as_str(), "https://www.example.com/markets");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match resolve_url(href, base_url) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::trace!("Ignoring link {} on {}: {}", href, base_url, e);
            None
        }
    }
}
