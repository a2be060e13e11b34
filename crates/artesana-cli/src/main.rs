mod collect;
mod summary;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::ScrapeOptions;

#[derive(Debug, Parser)]
#[command(name = "artesana-cli")]
#[command(about = "Scrapes the storefront catalog into a local image tree and reports")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Flags for the default `scrape` command when no subcommand is given
    #[command(flatten)]
    scrape: ScrapeArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover categories and products, resolve variants, download images
    Scrape(ScrapeArgs),
}

#[derive(Debug, Clone, PartialEq, Args)]
struct ScrapeArgs {
    /// Resolve variants and write reports without downloading images
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of products to process across all categories (0 = no cap)
    #[arg(long, default_value_t = 5)]
    max_products: usize,

    /// Minimum delay between HTTP requests, in seconds
    #[arg(long, value_name = "SECONDS", value_parser = parse_delay)]
    delay: Option<Duration>,

    /// Storefront root URL (overrides ARTESANA_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Root directory for images and reports (overrides ARTESANA_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Products processed concurrently within a category
    #[arg(long, value_parser = parse_concurrency)]
    concurrency: Option<usize>,
}

impl Cli {
    fn into_scrape_args(self) -> ScrapeArgs {
        match self.command {
            Some(Commands::Scrape(args)) => args,
            None => self.scrape,
        }
    }
}

impl ScrapeArgs {
    /// Applies command-line overrides on top of the env-derived config.
    fn apply_to(&self, config: &mut artesana_core::AppConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(delay) = self.delay {
            config.inter_request_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrent_products = concurrency;
        }
    }

    fn options(&self, config: &artesana_core::AppConfig) -> ScrapeOptions {
        ScrapeOptions {
            dry_run: self.dry_run,
            max_products: (self.max_products > 0).then_some(self.max_products),
            concurrency: config.max_concurrent_products.max(1),
        }
    }
}

fn parse_delay(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid delay '{raw}': {e}"))
}

fn parse_concurrency(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{raw}' is not a positive integer")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse().into_scrape_args();

    let mut config = artesana_core::load_app_config()?;
    args.apply_to(&mut config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = artesana_scraper::StorefrontClient::from_config(&config)
        .context("failed to build storefront client")?;
    let options = args.options(&config);

    tracing::info!(
        base_url = %config.base_url,
        dry_run = options.dry_run,
        max_products = ?options.max_products,
        concurrency = options.concurrency,
        "starting scrape"
    );
    let result = collect::run_scrape(&client, &config, &options).await;

    summary::print_summary(&result);
    match artesana_scraper::write_reports(&result, &config.output_dir).await {
        Ok(paths) => summary::print_report_paths(&paths),
        Err(e) => tracing::error!(
            output_dir = %config.output_dir.display(),
            error = %e,
            "failed to write reports"
        ),
    }

    Ok(())
}
