use crate::config::Config;
use crate::extract::UNKNOWN;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Default article shape: a hyphen, exactly twelve digits, then `_1.html`
pub const DEFAULT_ARTICLE_PATTERN: &str = r"-(\d{12})_1\.html$";

/// Why a URL was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Host is not exactly the allowed domain
    ForeignHost,
    /// URL contains this blacklisted substring
    Blacklisted(String),
}

/// Classification types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Article page - fetch and extract
    Article,
    /// Navigation page - fetch and follow its links
    Navigable,
    /// Out of bounds - never fetched
    Rejected(RejectReason),
}

impl Classification {
    /// Returns true if the URL may be fetched
    pub fn should_visit(&self) -> bool {
        !self.is_rejected()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Site-wide rules the classifier evaluates
#[derive(Debug, Clone)]
pub struct SiteRules {
    allowed_domain: String,
    blacklist: Vec<String>,
    article_pattern: Regex,
}

impl SiteRules {
    /// Builds rules with the default article pattern
    pub fn new(
        allowed_domain: impl Into<String>,
        blacklist: Vec<String>,
    ) -> Result<Self, ConfigError> {
        Self::with_article_pattern(allowed_domain, blacklist, DEFAULT_ARTICLE_PATTERN)
    }

    /// Builds rules with a custom article pattern
    ///
    /// The pattern is matched against the URL path and its first capture
    /// group is the article id.
    pub fn with_article_pattern(
        allowed_domain: impl Into<String>,
        blacklist: Vec<String>,
        pattern: &str,
    ) -> Result<Self, ConfigError> {
        crate::config::validate_article_pattern(pattern)?;
        let article_pattern = Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            allowed_domain: allowed_domain.into().to_lowercase(),
            blacklist,
            article_pattern,
        })
    }

    /// Builds rules from the `[crawler]` and `[site]` sections
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::with_article_pattern(
            config.crawler.allowed_domain.as_str(),
            config.site.blacklist.clone(),
            config
                .site
                .article_pattern
                .as_deref()
                .unwrap_or(DEFAULT_ARTICLE_PATTERN),
        )
    }

    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }
}

/// Classifies a URL according to the site rules
///
/// Rules are checked in priority order and the first match wins:
/// 1. Host differs from the allowed domain (exact match, so language
///    subdomains such as `hindi.` are rejected too)
/// 2. Any blacklist substring occurs anywhere in the URL
/// 3. Path matches the article pattern
/// 4. Navigable (default)
///
/// The blacklist test is a plain substring search over the whole URL, so a
/// blacklisted token inside an article slug rejects that article as well.
///
/// # Examples
///
/// ```
/// use headline_harvest::url::{classify, Classification, SiteRules};
/// use url::Url;
///
/// let rules = SiteRules::new("www.example.com", vec!["/sports".to_string()]).unwrap();
/// let url = Url::parse("https://www.example.com/markets/rally-123456789012_1.html").unwrap();
/// assert_eq!(classify(&url, &rules), Classification::Article);
/// ```
pub fn classify(url: &Url, rules: &SiteRules) -> Classification {
    // Priority 1: host
    let host_matches = url
        .host_str()
        .map_or(false, |host| host.eq_ignore_ascii_case(&rules.allowed_domain));
    if !host_matches {
        return Classification::Rejected(RejectReason::ForeignHost);
    }

    // Priority 2: blacklist
    let full = url.as_str();
    if let Some(hit) = rules.blacklist.iter().find(|entry| full.contains(entry.as_str())) {
        return Classification::Rejected(RejectReason::Blacklisted(hit.clone()));
    }

    // Priority 3: article shape
    if rules.article_pattern.is_match(url.path()) {
        return Classification::Article;
    }

    Classification::Navigable
}

/// Extracts the article id from a URL, or `"unknown"` when it has none
pub fn article_id(url: &Url, rules: &SiteRules) -> String {
    rules
        .article_pattern
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
