//! Markdown summary generation
//!
//! This module writes a human-readable markdown report of a crawl run.

use crate::output::stats::CrawlSummary;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the crawl to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Headline-Harvest Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", summary.start_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds ({:.2} minutes)\n",
        summary.duration_seconds,
        summary.duration_seconds / 60.0
    ));
    md.push_str(&format!("- **Stopped**: {}\n", summary.stop_reason));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Fetching
    md.push_str("## Fetching\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| URLs visited | {} |\n", summary.urls_visited));
    md.push_str(&format!(
        "| Requests dispatched | {} |\n",
        summary.pages_dispatched
    ));
    md.push_str(&format!("| Pages fetched | {} |\n", summary.pages_fetched));
    md.push_str(&format!(
        "| Article pages fetched | {} |\n",
        summary.articles_fetched
    ));
    md.push_str(&format!("| Redirects | {} |\n", summary.redirects));
    md.push_str(&format!("| Fetch failures | {} |\n", summary.fetch_failures));
    md.push_str(&format!(
        "| Success rate | {:.2}% |\n\n",
        summary.success_rate()
    ));

    // Output
    md.push_str("## Output\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!(
        "| Records written | {} |\n",
        summary.records_written
    ));
    md.push_str(&format!("| URLs written | {} |\n", summary.urls_written));
    md.push_str(&format!(
        "| Articles without metadata | {} |\n",
        summary.empty_extractions
    ));
    md.push_str(&format!("| Sink errors | {} |\n\n", summary.sink_errors));

    // Link filtering
    md.push_str("## Link Filtering\n\n");
    md.push_str(&format!(
        "- **Rejected (foreign host or blacklist)**: {}\n",
        summary.links_rejected
    ));
    md.push_str(&format!(
        "- **Beyond max depth**: {}\n",
        summary.links_too_deep
    ));

    md
}
