//! Aggregate run results, serialized as the JSON report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Product};
use crate::variants::VariantMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadOutcome {
    /// The URL was already materialized in this run, or the destination file
    /// existed on disk. No network request was issued.
    AlreadyPresent,
    Downloaded,
    Failed,
}

impl DownloadOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub source_url: String,
    pub destination_path: String,
    pub outcome: DownloadOutcome,
}

/// How variant resolution for a product page ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// The page yielded a main image or at least one variant candidate.
    Found,
    /// The page was parsed but nothing usable was identified.
    Empty,
    /// The product page could not be fetched.
    FetchFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReport {
    #[serde(flatten)]
    pub product: Product,
    pub resolution: ResolutionStatus,
    pub main_image: Option<String>,
    pub variants: VariantMap,
    /// Every download attempted for this product, successful or not.
    #[serde(default)]
    pub downloads: Vec<DownloadRecord>,
    /// Destination paths of successful downloads, in attempt order.
    pub downloaded_images: Vec<String>,
    pub downloaded_image_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<ProductReport>,
}

/// Aggregate root of a scrape run.
///
/// Built incrementally while categories are processed; only the totals are
/// touched after a category has been appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub base_url: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub categories: Vec<CategoryReport>,
    pub total_products: usize,
    pub total_images: usize,
    /// Product pages that could not be fetched. Soft failures, not errors.
    pub product_fetch_failures: usize,
    /// Failed downloads, formatted for humans.
    pub errors: Vec<String>,
}

impl ScrapeResult {
    #[must_use]
    pub fn new(base_url: impl Into<String>, dry_run: bool) -> Self {
        Self {
            base_url: base_url.into(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            categories: Vec::new(),
            total_products: 0,
            total_images: 0,
            product_fetch_failures: 0,
            errors: Vec::new(),
        }
    }

    /// Appends a finished category and folds its products into the totals.
    pub fn push_category(&mut self, category: CategoryReport, errors: Vec<String>) {
        self.total_products += category.products.len();
        self.total_images += category
            .products
            .iter()
            .map(|p| p.downloaded_image_count)
            .sum::<usize>();
        self.product_fetch_failures += category
            .products
            .iter()
            .filter(|p| p.resolution == ResolutionStatus::FetchFailed)
            .count();
        self.errors.extend(errors);
        self.categories.push(category);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_report(slug: &str, images: usize, resolution: ResolutionStatus) -> ProductReport {
        ProductReport {
            product: Product {
                name: slug.to_string(),
                slug: slug.to_string(),
                url: format!("http://shop.test/product/{slug}/"),
                category_slug: "bolsas".to_string(),
            },
            resolution,
            main_image: None,
            variants: VariantMap::default_only(),
            downloads: Vec::new(),
            downloaded_images: Vec::new(),
            downloaded_image_count: images,
        }
    }

    #[test]
    fn push_category_accumulates_totals() {
        let mut result = ScrapeResult::new("http://shop.test", false);
        let category = CategoryReport {
            category: Category {
                name: "Bolsas".to_string(),
                slug: "bolsas".to_string(),
                url: "http://shop.test/product-category/bolsas/".to_string(),
            },
            products: vec![
                product_report("a", 2, ResolutionStatus::Found),
                product_report("b", 0, ResolutionStatus::FetchFailed),
            ],
        };

        result.push_category(category, vec!["error downloading x".to_string()]);

        assert_eq!(result.total_products, 2);
        assert_eq!(result.total_images, 2);
        assert_eq!(result.product_fetch_failures, 1);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn product_report_flattens_product_fields() {
        let report = product_report("tote", 0, ResolutionStatus::Empty);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["slug"], "tote");
        assert_eq!(value["category_slug"], "bolsas");
        assert_eq!(value["resolution"], "empty");
        assert_eq!(value["variants"]["default"], serde_json::json!([]));
    }
}
