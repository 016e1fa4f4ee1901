//! Headline-Harvest main entry point
//!
//! This is the command-line interface for the Headline-Harvest news crawler.

use anyhow::Context;
use clap::Parser;
use headline_harvest::config::{apply_overrides, load_config_with_hash, Config};
use headline_harvest::crawler::Coordinator;
use headline_harvest::output::{generate_markdown_summary, print_statistics};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Headline-Harvest: a single-site news article crawler
///
/// Headline-Harvest crawls one news website, tells article pages apart from
/// navigation pages, and extracts the JSON-LD metadata embedded in each
/// article.
#[derive(Parser, Debug)]
#[command(name = "headline-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A single-site news article crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Collect article URLs without fetching the articles
    #[arg(long)]
    urls_only: bool,

    /// Write output to this path instead of the configured one
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    let output_override = cli.output.as_ref().map(|p| p.to_string_lossy().into_owned());
    apply_overrides(&mut config, cli.urls_only, output_override.as_deref())
        .context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("headline_harvest=info,warn"),
            1 => EnvFilter::new("headline_harvest=debug,info"),
            2 => EnvFilter::new("headline_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Headline-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Allowed domain: {}", config.crawler.allowed_domain);
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unbounded"),
    }
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    if let Some(pages) = config.crawler.max_pages {
        println!("  Max pages: {}", pages);
    }
    if let Some(secs) = config.crawler.max_duration_secs {
        println!("  Max duration: {}s", secs);
    }

    println!("\nSite:");
    println!("  Media source: {}", config.site.media_source);
    println!(
        "  Article pattern: {}",
        config
            .site
            .article_pattern
            .as_deref()
            .unwrap_or(headline_harvest::url::DEFAULT_ARTICLE_PATTERN)
    );
    println!("  Blacklist ({}):", config.site.blacklist.len());
    for entry in &config.site.blacklist {
        println!("    - {}", entry);
    }

    if config.user_agent.pool.is_empty() {
        println!("\nUser Agents: built-in pool");
    } else {
        println!("\nUser Agents: {} configured", config.user_agent.pool.len());
    }

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Format: {:?}", config.output.format);
    println!("  Mode: {:?}", config.output.mode);
    if let Some(summary_path) = &config.output.summary_path {
        println!("  Summary: {}", summary_path);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", config.crawler.start_url);
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: String) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (blacklist: {} entries, mode: {:?})",
        config.crawler.allowed_domain,
        config.site.blacklist.len(),
        config.output.mode
    );

    let coordinator = Coordinator::new(config).context("failed to start crawl")?;

    // Ctrl-C stops new dispatches; in-flight fetches still finish
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            token.cancel();
        }
    });

    let mut summary = coordinator.run().await?;
    summary.config_hash = Some(config_hash);

    println!();
    print_statistics(&summary);

    if let Some(summary_path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(summary_path))
            .with_context(|| format!("failed to write summary to {}", summary_path))?;
        println!("\n✓ Summary written to: {}", summary_path);
    }

    println!("✓ Output written to: {}", config.output.path);
    Ok(())
}
