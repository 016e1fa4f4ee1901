use crate::extract::record::{ArticleRecord, SCRAPED_AT_FORMAT, UNKNOWN};
use crate::url::{article_id, SiteRules};
use scraper::{Html, Selector};
use serde_json::{Map, Value};
use url::Url;

const JSONLD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Extracts article records from the JSON-LD blocks of one page
///
/// Each block yields at most one record: a top-level object with a
/// `headline`, or the first such object inside a top-level array. Blocks
/// without a headline (breadcrumbs, organization data) are ignored, and a
/// block that fails to parse is logged and skipped without affecting the
/// others. The article id comes from the URL, not from the metadata.
///
/// # Arguments
///
/// * `url` - The article URL the page was fetched from
/// * `html` - The raw page content
/// * `media_source` - Publisher name stamped on each record
/// * `rules` - Site rules providing the article id pattern
///
/// # Example
///
/// ```
/// use headline_harvest::extract::extract_articles;
/// use headline_harvest::url::SiteRules;
/// use url::Url;
///
/// let rules = SiteRules::new("www.example.com", vec![]).unwrap();
/// let url = Url::parse("https://www.example.com/economy/gdp-beats-123456789012_1.html").unwrap();
/// let html = r#"<script type="application/ld+json">{"headline": "GDP beats estimates"}</script>"#;
///
/// let records = extract_articles(&url, html, "Example News", &rules);
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].article_id, "123456789012");
/// ```
pub fn extract_articles(
    url: &Url,
    html: &str,
    media_source: &str,
    rules: &SiteRules,
) -> Vec<ArticleRecord> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(JSONLD_SELECTOR) {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    let id = article_id(url, rules);
    let mut records = Vec::new();

    for (index, element) in document.select(&selector).enumerate() {
        let raw = element.text().collect::<String>();

        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Skipping malformed JSON-LD block {} on {}: {}", index, url, e);
                continue;
            }
        };

        match headline_object(&value) {
            Some(object) => records.push(build_record(url, object, media_source, &id)),
            None => tracing::trace!("JSON-LD block {} on {} has no headline", index, url),
        }
    }

    records
}

/// Normalizes the `keywords` field
///
/// A list keeps its string entries as they are. A string is split on commas,
/// each item trimmed, and empty items dropped. Anything else yields no keywords.
///
/// # Example
///
/// ```
/// use headline_harvest::extract::normalize_keywords;
/// use serde_json::json;
///
/// assert_eq!(normalize_keywords(Some(&json!("a, b,c"))), vec!["a", "b", "c"]);
/// assert_eq!(normalize_keywords(Some(&json!(["a", "b"]))), vec!["a", "b"]);
/// ```
pub fn normalize_keywords(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn headline_object(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(object) if object.contains_key("headline") => Some(object),
        Value::Array(items) => items.iter().find_map(|item| match item {
            Value::Object(object) if object.contains_key("headline") => Some(object),
            _ => None,
        }),
        _ => None,
    }
}

fn build_record(
    url: &Url,
    object: &Map<String, Value>,
    media_source: &str,
    article_id: &str,
) -> ArticleRecord {
    let date = text_field(object, "dateModified")
        .or_else(|| text_field(object, "datePublished"))
        .unwrap_or_else(|| UNKNOWN.to_string());

    ArticleRecord {
        url: url.to_string(),
        title: text_field(object, "headline").unwrap_or_else(|| UNKNOWN.to_string()),
        content: text_field(object, "articleBody").unwrap_or_else(|| UNKNOWN.to_string()),
        keywords: normalize_keywords(object.get("keywords")),
        date,
        media_source: media_source.to_string(),
        article_id: article_id.to_string(),
        scraped_at: chrono::Local::now().format(SCRAPED_AT_FORMAT).to_string(),
    }
}

/// Trimmed string value; null, blank and non-string values count as missing
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
