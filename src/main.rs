//! Quatermain main entry point
//!
//! This is the command-line interface for the Quatermain sitemap crawler.

use anyhow::Context;
use clap::Parser;
use quatermain::config::{resolve_config, Config, ConfigOverrides};
use quatermain::crawler::crawl;
use quatermain::output::{print_report, write_sitemap, OutputError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Quatermain: a same-domain sitemap crawler
///
/// Quatermain fetches every reachable page of the seed's site while
/// respecting robots.txt and page-level robots directives, then writes a
/// sitemap and reports the pages that could not be fetched.
#[derive(Parser, Debug)]
#[command(name = "quatermain")]
#[command(version = "1.0.0")]
#[command(about = "A same-domain sitemap crawler", long_about = None)]
struct Cli {
    /// URL the crawl starts from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent connections (at least 2)
    #[arg(short = 'c', long)]
    max_connections: Option<usize>,

    /// Delay before each request, in seconds
    #[arg(short = 'i', long = "interval")]
    interval: Option<f64>,

    /// Ignore robots.txt, robots meta tags, X-Robots-Tag and rel="nofollow"
    #[arg(long)]
    unethical: bool,

    /// User agent sent with requests and matched against robots.txt
    #[arg(long)]
    user_agent: Option<String>,

    /// Where to write the sitemap
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_connections: self.max_connections,
            request_interval: self.interval,
            unethical: self.unethical,
            user_agent: self.user_agent.clone(),
            sitemap_path: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Invalid configuration")?;

    handle_crawl(&config, &cli.url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quatermain=info,warn"),
            1 => EnvFilter::new("quatermain=debug,info"),
            2 => EnvFilter::new("quatermain=trace,debug"),
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

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, seed: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} (ethical: {}, interval: {}s)",
        seed,
        config.crawler.ethical,
        config.crawler.request_interval
    );

    let registry = crawl(config, seed)
        .await
        .with_context(|| format!("Could not crawl {}", seed))?;

    print_report(&registry);

    let sitemap_path = Path::new(&config.output.sitemap_path);
    match write_sitemap(&registry, sitemap_path) {
        Ok(entries) => println!(
            "\n✓ Sitemap with {} entries written to: {}",
            entries,
            sitemap_path.display()
        ),
        Err(OutputError::NothingToWrite) => {
            tracing::warn!("No page was fetched successfully; sitemap not written")
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Could not write sitemap to {}", sitemap_path.display())
            })
        }
    }

    Ok(())
}
