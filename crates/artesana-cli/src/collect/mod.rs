//! Scrape orchestration: discovery, resolution and materialization for every
//! category, folded into one [`ScrapeResult`].
//!
//! Categories run one after another. Failures below the category level are
//! soft and end up in the result, so a run always produces a report.

mod runner;

use std::sync::Arc;

use artesana_core::{AppConfig, ScrapeResult};
use artesana_scraper::{discover_categories, discover_products, DedupCache, Materializer, StorefrontClient};

/// Per-run knobs that come from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScrapeOptions {
    /// Resolve variants but skip every download.
    pub dry_run: bool,
    /// Products to process across all categories; `None` means no cap.
    pub max_products: Option<usize>,
    /// Products resolved and materialized concurrently within a category.
    pub concurrency: usize,
}

/// Runs the full pipeline against the storefront behind `client`.
///
/// The product cap is applied between products: each category's product
/// list is cut to the remaining budget and no further category page is
/// fetched once it is spent.
pub(crate) async fn run_scrape(
    client: &StorefrontClient,
    config: &AppConfig,
    options: &ScrapeOptions,
) -> ScrapeResult {
    let mut result = ScrapeResult::new(config.base_url.clone(), options.dry_run);

    let categories = discover_categories(client, &config.shop_url()).await;
    if categories.is_empty() {
        tracing::warn!(shop_url = %config.shop_url(), "no categories found");
    }

    let materializer = (!options.dry_run).then(|| {
        Materializer::new(client.clone(), &config.output_dir, Arc::new(DedupCache::new()))
    });

    let mut remaining = options.max_products;
    for category in categories {
        if remaining == Some(0) {
            tracing::info!(
                max_products = ?options.max_products,
                "product limit reached; skipping remaining categories"
            );
            break;
        }

        let mut products = discover_products(client, &category).await;
        if let Some(budget) = remaining {
            products.truncate(budget);
            remaining = Some(budget - products.len());
        }

        let (report, errors) = runner::process_category(
            client,
            materializer.as_ref(),
            category,
            products,
            options.concurrency,
        )
        .await;
        result.push_category(report, errors);
    }

    result.finish();
    tracing::info!(
        categories = result.categories.len(),
        products = result.total_products,
        images = result.total_images,
        errors = result.errors.len(),
        fetch_failures = result.product_fetch_failures,
        "scrape finished"
    );
    result
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
