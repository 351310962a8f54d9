//! Link-Harvest main entry point
//!
//! This is the command-line interface for the Link-Harvest crawler.

use anyhow::Context;
use clap::Parser;
use link_harvest::config::{self, load_config_with_hash, Config};
use link_harvest::crawler::crawl;
use link_harvest::output::print_summary;
use link_harvest::SeedSet;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Link-Harvest: fetch a batch of pages and record the links they contain
///
/// Every seed URL is fetched once, its markup is scanned for href
/// references, and each resolved link is appended to a tab-separated
/// results file as `source_url<TAB>parsed_url`.
#[derive(Parser, Debug)]
#[command(name = "link-harvest")]
#[command(version)]
#[command(about = "Harvest links from a batch of pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed list to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    seeds: Option<PathBuf>,

    /// Results file to use instead of the configured one
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Maximum number of pages fetched at once
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seeds and show what would be crawled
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli)?;

    let seeds_path = Path::new(&config.input.seeds_path);
    let seeds = SeedSet::load(seeds_path)?;
    tracing::info!("Loaded {} seed URLs from {}", seeds.len(), seeds_path.display());

    if cli.dry_run {
        handle_dry_run(&config, &seeds);
        return Ok(());
    }

    handle_crawl(&config, &seeds, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG`, when set, takes precedence over the flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "link_harvest=info,warn",
            1 => "link_harvest=debug,info",
            2 => "link_harvest=trace,debug",
            _ => "trace",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Applies command-line overrides and re-validates
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(seeds) = &cli.seeds {
        config.input.seeds_path = seeds.to_string_lossy().into_owned();
    }
    if let Some(output) = &cli.output {
        config.output.results_path = output.to_string_lossy().into_owned();
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_pages_open = concurrency;
    }
    config::validate(config).context("invalid command-line override")?;
    Ok(())
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, seeds: &SeedSet) {
    println!("=== Link-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent pages: {}",
        config.crawler.max_concurrent_pages_open
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Results: {}", config.output.results_path);

    println!("\nSeeds ({}):", seeds.len());
    for url in seeds.iter() {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} seed URLs", seeds.len());
}

/// Handles the main crawl operation
///
/// Ctrl-C cancels in-flight fetches; the crawl still joins every page and the
/// process exits successfully. Individual page failures never change the exit
/// status.
async fn handle_crawl(config: &Config, seeds: &SeedSet, quiet: bool) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling in-flight fetches");
            on_interrupt.cancel();
        }
    });

    let summary = crawl(config, seeds, cancel)
        .await
        .context("crawl could not start")?;

    tracing::info!(
        "Crawl finished: {} pages with links, {} without, {} failed, {} rows written to {}",
        summary.pages_with_links,
        summary.pages_without_links,
        summary.pages_failed,
        summary.rows_written,
        config.output.results_path
    );

    if !quiet {
        print_summary(&summary);
    }

    Ok(())
}
