//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use headline_harvest::config::{
    Config, CrawlerConfig, OutputConfig, OutputFormat, OutputMode, SiteConfig, UserAgentConfig,
};
use headline_harvest::crawler::{Coordinator, HttpFetcher, IdentityProvider};
use headline_harvest::output::{MemorySink, StopReason};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ARTICLE_PATH: &str = "/business/story-politics-2025-123456789012_1.html";
const SECOND_ARTICLE_PATH: &str = "/markets/sensex-closes-higher-123456789099_1.html";

/// Creates a test configuration crawling the mock server
fn create_test_config(base_url: &str, output_path: &str) -> Config {
    let domain = url::Url::parse(base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string();

    Config {
        crawler: CrawlerConfig {
            start_url: format!("{}/", base_url),
            allowed_domain: domain,
            max_depth: None,
            request_delay_ms: 10, // Very short for testing
            request_timeout_secs: 5,
            max_concurrent_requests: 2,
            max_pages: None,
            max_duration_secs: None,
        },
        site: SiteConfig {
            media_source: "Test Standard".to_string(),
            blacklist: vec!["/sports".to_string(), "/web-stories".to_string()],
            article_pattern: None,
        },
        user_agent: UserAgentConfig::default(),
        output: OutputConfig {
            path: output_path.to_string(),
            format: OutputFormat::Jsonl,
            mode: OutputMode::Articles,
            summary_path: None,
        },
    }
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn article_page() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(
            r#"<html><head>
            <script type="application/ld+json">{"@type": "BreadcrumbList", "itemListElement": []}</script>
            <script type="application/ld+json">
            {"@type": "NewsArticle",
             "headline": "  Parliament passes budget  ",
             "articleBody": "The lower house passed the budget on Friday.",
             "keywords": "budget, parliament, ",
             "datePublished": "2025-02-01T10:00:00+05:30",
             "dateModified": "2025-02-01T12:30:00+05:30"}
            </script></head><body><a href="/business/other">more</a></body></html>"#,
        )
        .insert_header("content-type", "text/html")
}

fn second_article_page() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(
            r#"<html><head>
            <script type="application/ld+json">
            [{"@type": "WebPage"},
             {"@type": "NewsArticle", "headline": "Sensex closes higher",
              "articleBody": "Markets rallied.", "keywords": ["sensex", "markets"]}]
            </script></head><body></body></html>"#,
        )
        .insert_header("content-type", "text/html")
}

/// How many times each page of the mock site must be requested
struct ExpectedHits {
    overview: u64,
    article: u64,
    second_article: u64,
}

const EVERY_PAGE_ONCE: ExpectedHits = ExpectedHits {
    overview: 1,
    article: 1,
    second_article: 1,
};

/// Mounts a small news site: a home page, one section page and two articles
async fn mount_site(mock_server: &MockServer, overview: ResponseTemplate, hits: ExpectedHits) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}">Top story</a>
               <a href="/sports/live">Live scores</a>
               <a href="/markets/overview">Markets</a>
               <a href="https://elsewhere.example/">Partner</a>
               <a href="{}#comments">Top story comments</a>"#,
            ARTICLE_PATH, ARTICLE_PATH
        )))
        .expect(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/markets/overview"))
        .respond_with(overview)
        .expect(hits.overview)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .respond_with(article_page())
        .expect(hits.article)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(SECOND_ARTICLE_PATH))
        .respond_with(second_article_page())
        .expect(hits.second_article)
        .mount(mock_server)
        .await;

    // Blacklisted section must never be requested
    Mock::given(method("GET"))
        .and(path("/sports/live"))
        .respond_with(html_page("<p>scores</p>"))
        .expect(0)
        .mount(mock_server)
        .await;
}

fn overview_page() -> ResponseTemplate {
    html_page(&format!(
        r#"<a href="/">Home</a>
           <a href="{}?ref=markets">Top story</a>
           <a href="{}">Sensex</a>
           <a href="/web-stories/markets">Stories</a>"#,
        ARTICLE_PATH, SECOND_ARTICLE_PATH
    ))
}

fn http_fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::with_timeout(Duration::from_secs(5)).expect("Failed to build client"))
}

#[tokio::test]
async fn test_full_crawl_extracts_articles() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, overview_page(), EVERY_PAGE_ONCE).await;

    let config = create_test_config(&mock_server.uri(), "unused.jsonl");
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    let mut records = sink.articles();
    records.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(records.len(), 2);

    let budget = &records[0];
    assert_eq!(budget.title, "Parliament passes budget");
    assert_eq!(
        budget.content,
        "The lower house passed the budget on Friday."
    );
    assert_eq!(budget.keywords, vec!["budget", "parliament"]);
    assert_eq!(budget.date, "2025-02-01T12:30:00+05:30");
    assert_eq!(budget.article_id, "123456789012");
    assert_eq!(budget.media_source, "Test Standard");
    assert!(budget.url.ends_with(ARTICLE_PATH));

    let sensex = &records[1];
    assert_eq!(sensex.title, "Sensex closes higher");
    assert_eq!(sensex.keywords, vec!["sensex", "markets"]);
    assert_eq!(sensex.date, "unknown");
    assert_eq!(sensex.article_id, "123456789099");

    assert_eq!(summary.stop_reason, StopReason::Exhausted);
    assert_eq!(summary.articles_fetched, 2);
    assert_eq!(summary.records_written, 2);
    assert_eq!(summary.fetch_failures, 0);
    assert!(sink.is_finished());

    // Wiremock will automatically verify expectations when mock_server drops
}

#[tokio::test]
async fn test_server_error_is_not_fatal() {
    let mock_server = MockServer::start().await;
    let hits = ExpectedHits {
        overview: 1,
        article: 1,
        second_article: 0,
    };
    mount_site(&mock_server, ResponseTemplate::new(500), hits).await;

    let config = create_test_config(&mock_server.uri(), "unused.jsonl");
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    // Only the article linked from the home page is reachable
    let titles: Vec<String> = sink.articles().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Parliament passes budget"]);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.pages_dispatched, 3);
    assert_eq!(summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_url_only_mode_does_not_fetch_articles() {
    let mock_server = MockServer::start().await;
    let hits = ExpectedHits {
        overview: 1,
        article: 0,
        second_article: 0,
    };
    mount_site(&mock_server, overview_page(), hits).await;

    let mut config = create_test_config(&mock_server.uri(), "unused.jsonl");
    config.output.mode = OutputMode::Urls;
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    let mut urls = sink.urls();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}{}", mock_server.uri(), ARTICLE_PATH),
            format!("{}{}", mock_server.uri(), SECOND_ARTICLE_PATH),
        ]
    );
    assert_eq!(summary.urls_written, 2);
    assert!(sink.articles().is_empty());
}

#[tokio::test]
async fn test_depth_limit_stops_navigation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/level1">Level 1</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html_page(&format!(
            r#"<a href="/level2">Level 2</a><a href="{}">Story</a>"#,
            ARTICLE_PATH
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_page("<p>too deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .respond_with(article_page())
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), "unused.jsonl");
    config.crawler.max_depth = Some(1);
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    // The article sits at depth 2 but articles are never expanded
    assert_eq!(sink.articles().len(), 1);
    assert_eq!(summary.links_too_deep, 1);
}

struct FixedIdentity;

impl IdentityProvider for FixedIdentity {
    fn user_agent(&self) -> String {
        "HarvestTest/1.0".to_string()
    }
}

#[tokio::test]
async fn test_requests_carry_identity_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("User-Agent", "HarvestTest/1.0"))
        .respond_with(html_page(&format!(r#"<a href="{}">Story</a>"#, ARTICLE_PATH)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .and(header("User-Agent", "HarvestTest/1.0"))
        .respond_with(article_page())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "unused.jsonl");
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator")
        .with_identity(Arc::new(FixedIdentity));
    coordinator.run().await.expect("Crawl failed");

    assert_eq!(sink.articles().len(), 1);
}

#[tokio::test]
async fn test_page_budget_with_real_client() {
    let mock_server = MockServer::start().await;
    // The budget cuts the crawl before the section page is reached
    let hits = ExpectedHits {
        overview: 0,
        article: 1,
        second_article: 0,
    };
    mount_site(&mock_server, overview_page(), hits).await;

    let mut config = create_test_config(&mock_server.uri(), "unused.jsonl");
    config.crawler.max_pages = Some(2);
    config.crawler.max_concurrent_requests = 1;
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_dispatched, 2);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.stop_reason, StopReason::PageBudget);
}

fn redirect_to(status: u16, location: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).insert_header("location", location)
}

#[tokio::test]
async fn test_redirect_targets_go_through_the_classifier() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="/markets/moved">Markets</a>
               <a href="/old-section">Old section</a>
               <a href="/latest">Latest</a>
               <a href="/partner">Partner</a>
               <a href="{}">Top story</a>"#,
            ARTICLE_PATH
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/markets/moved"))
        .respond_with(redirect_to(302, "/sports/live"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old-section"))
        .respond_with(redirect_to(
            301,
            &format!("{}/web-stories/markets", mock_server.uri()),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(redirect_to(302, ARTICLE_PATH))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/partner"))
        .respond_with(redirect_to(302, "https://elsewhere.example/"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Redirect targets that are blacklisted must never be requested
    Mock::given(method("GET"))
        .and(path("/sports/live"))
        .respond_with(html_page("<p>scores</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/web-stories/markets"))
        .respond_with(html_page("<p>stories</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    // Linked directly and reached by redirect, fetched once
    Mock::given(method("GET"))
        .and(path(ARTICLE_PATH))
        .respond_with(article_page())
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), "unused.jsonl");
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::with_parts(&config, http_fetcher(), sink.clone())
        .expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    let titles: Vec<String> = sink.articles().into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Parliament passes budget"]);
    assert_eq!(summary.redirects, 4);
    assert_eq!(summary.links_rejected, 3);
    assert_eq!(summary.pages_dispatched, 6);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.fetch_failures, 0);
}

#[tokio::test]
async fn test_jsonl_output_file() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server, overview_page(), EVERY_PAGE_ONCE).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("articles.jsonl");
    let summary_path = dir.path().join("summary.md");

    let mut config = create_test_config(&mock_server.uri(), &output_path.to_string_lossy());
    config.output.summary_path = Some(summary_path.to_string_lossy().into_owned());

    let coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");
    headline_harvest::output::generate_markdown_summary(&summary, &summary_path)
        .expect("Failed to write summary");

    let content = std::fs::read_to_string(&output_path).expect("Failed to read output");
    let mut titles: Vec<String> = content
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("Invalid JSON line");
            value["title"].as_str().unwrap_or_default().to_string()
        })
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Parliament passes budget", "Sensex closes higher"]);

    let markdown = std::fs::read_to_string(&summary_path).expect("Failed to read summary");
    assert!(markdown.contains("| Records written | 2 |"));
}
