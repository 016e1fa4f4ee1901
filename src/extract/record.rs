use serde::{Deserialize, Serialize};

/// Sentinel stored in place of any missing string field
pub const UNKNOWN: &str = "unknown";

/// Format of the `scraped_at` timestamp
pub const SCRAPED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalized metadata for one article
///
/// Every field is always present. Missing strings hold [`UNKNOWN`] and missing
/// keywords are an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub date: String,
    pub media_source: String,
    pub article_id: String,
    pub scraped_at: String,
}

impl ArticleRecord {
    /// Keywords flattened for single-column formats
    pub fn keywords_joined(&self) -> String {
        self.keywords.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_every_field() {
        let record = ArticleRecord {
            url: "https://www.example.com/a-123456789012_1.html".to_string(),
            title: UNKNOWN.to_string(),
            content: UNKNOWN.to_string(),
            keywords: vec![],
            date: UNKNOWN.to_string(),
            media_source: "Example News".to_string(),
            article_id: "123456789012".to_string(),
            scraped_at: "2025-01-01 00:00:00".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 8);
        assert_eq!(object["title"], "unknown");
        assert_eq!(object["keywords"], serde_json::json!([]));
    }

    #[test]
    fn test_keywords_joined() {
        let record = ArticleRecord {
            url: String::new(),
            title: String::new(),
            content: String::new(),
            keywords: vec!["rbi".to_string(), "repo rate".to_string()],
            date: String::new(),
            media_source: String::new(),
            article_id: String::new(),
            scraped_at: String::new(),
        };
        assert_eq!(record.keywords_joined(), "rbi, repo rate");
    }
}
