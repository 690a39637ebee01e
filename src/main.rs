//! Listing-Ripple main entry point
//!
//! This is the command-line interface for the Listing-Ripple listing harvester.

use anyhow::Context;
use clap::Parser;
use listing_ripple::config::{load_config_with_hash, Config, SearchOverrides};
use listing_ripple::crawler::{describe_settings, run_crawl, CrawlReport};
use listing_ripple::output::{load_statistics, print_statistics};
use listing_ripple::storage::open_storage;
use listing_ripple::url::build_search_url;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Listing-Ripple: a business-directory listing harvester
///
/// Listing-Ripple walks the search results for a query and location, visits
/// each business's listing page, and stores one structured record per business.
#[derive(Parser, Debug)]
#[command(name = "listing-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A business-directory listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Search query, overriding the configuration file
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Search location, overriding the configuration file
    #[arg(long, value_name = "LOCATION")]
    location: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Re-scrape businesses already stored by earlier runs
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // One line: context and cause chain joined by ": "
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = SearchOverrides {
        search_query: cli.query,
        location: cli.location,
    };

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config, &overrides)
        .with_context(|| format!("invalid configuration {}", cli.config.display()))?;
    tracing::debug!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, &config_hash, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_ripple=info,warn"),
            1 => EnvFilter::new("listing_ripple=debug,info"),
            2 => EnvFilter::new("listing_ripple=trace,debug"),
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
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let origin = Url::parse(&config.site.base_url).context("invalid base-url")?;
    let seed = build_search_url(
        &origin,
        &config.search.search_query,
        &config.search.location,
        0,
    )?;

    println!("=== Listing-Ripple Dry Run ===\n");

    println!("Search:");
    println!("  Query: {}", config.search.search_query);
    println!("  Location: {}", config.search.location);
    println!("  Seed URL: {}", seed);

    println!("\nCrawler Configuration:");
    for (name, value) in describe_settings(&config.crawler) {
        println!("  {}: {}", name, value);
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(path) = &config.output.jsonl_path {
        println!("  JSON Lines: {}", path);
    }
    if let Some(path) = &config.output.debug_html_path {
        println!("  Debug HTML: {}", path);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previously stored businesses)");
    }
    tracing::info!(
        "Searching for \"{}\" in {}",
        config.search.search_query,
        config.search.location
    );

    let report = run_crawl(config, config_hash, fresh)
        .await
        .context("crawl failed")?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &CrawlReport) {
    println!("\n=== Crawl Summary ===");
    println!("  Businesses scraped: {}", report.businesses_enqueued);
    println!(
        "  Unique businesses seen this run: {} (excluding {} carried over)",
        report.unique_seen, report.carried_over
    );
    println!("  Records emitted: {}", report.records_emitted);
    println!("  Failed requests: {}", report.failed_requests);
    if report.dropped_over_budget > 0 {
        println!("  Dropped over request budget: {}", report.dropped_over_budget);
    }
}
