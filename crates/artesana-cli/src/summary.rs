//! Human-readable end-of-run summary.

use std::fmt::Write as _;

use artesana_core::{ResolutionStatus, ScrapeResult};
use artesana_scraper::ReportPaths;

const RULE: &str = "==================================================";

pub(crate) fn print_summary(result: &ScrapeResult) {
    print!("{}", render_summary(result));
}

pub(crate) fn print_report_paths(paths: &ReportPaths) {
    println!("\nreports written:");
    println!("  json: {}", paths.json.display());
    match &paths.csv {
        Some(csv) => println!("  csv:  {}", csv.display()),
        None => println!("  csv:  (skipped, no variant rows)"),
    }
}

/// Totals first, then one block per category listing each product's
/// variants and image counts.
pub(crate) fn render_summary(result: &ScrapeResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}");
    let _ = writeln!(
        out,
        "scrape summary{}",
        if result.dry_run { " (dry run)" } else { "" }
    );
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "categories found:        {}", result.categories.len());
    let _ = writeln!(out, "total products:          {}", result.total_products);
    let _ = writeln!(out, "total images:            {}", result.total_images);
    let _ = writeln!(out, "errors:                  {}", result.errors.len());
    let _ = writeln!(out, "product fetch failures:  {}", result.product_fetch_failures);

    for category in &result.categories {
        let _ = writeln!(
            out,
            "\n{}: {} products",
            category.category.name,
            category.products.len()
        );
        for product in &category.products {
            let _ = writeln!(out, "  {}", product.product.name);
            if product.resolution == ResolutionStatus::FetchFailed {
                let _ = writeln!(out, "     page could not be fetched");
            }
            let labels: Vec<&str> = product.variants.labels().collect();
            let _ = writeln!(out, "     variants: {}", labels.join(", "));
            let _ = writeln!(
                out,
                "     total images: {}",
                product.variants.candidate_count()
            );
            if !result.dry_run {
                let _ = writeln!(out, "     downloaded: {}", product.downloaded_image_count);
            }
        }
    }

    if !result.errors.is_empty() {
        let _ = writeln!(out, "\nerrors:");
        for error in &result.errors {
            let _ = writeln!(out, "  {error}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use artesana_core::{Category, CategoryReport, Product, ProductReport, VariantMap};

    use super::*;

    fn result(dry_run: bool) -> ScrapeResult {
        let mut variants = VariantMap::new();
        variants.insert("Negro", vec!["http://shop.test/wp-content/uploads/negro.jpg".to_string()]);
        variants.insert("Beige", Vec::new());

        let mut result = ScrapeResult::new("http://shop.test", dry_run);
        result.push_category(
            CategoryReport {
                category: Category {
                    name: "Bolsas".to_string(),
                    slug: "bolsas".to_string(),
                    url: "http://shop.test/product-category/bolsas/".to_string(),
                },
                products: vec![ProductReport {
                    product: Product {
                        name: "Bolsa Tejida".to_string(),
                        slug: "bolsa-tejida".to_string(),
                        url: "http://shop.test/product/bolsa-tejida/".to_string(),
                        category_slug: "bolsas".to_string(),
                    },
                    resolution: ResolutionStatus::Found,
                    main_image: None,
                    variants,
                    downloads: Vec::new(),
                    downloaded_images: vec!["scraper/Bolsas/Bolsa Tejida/Negro.jpg".to_string()],
                    downloaded_image_count: 1,
                }],
            },
            vec!["error downloading http://shop.test/x.jpg for variant Rojo: boom".to_string()],
        );
        result.finish();
        result
    }

    #[test]
    fn summary_lists_totals_and_products() {
        let text = render_summary(&result(false));

        assert!(text.contains("categories found:        1"));
        assert!(text.contains("total products:          1"));
        assert!(text.contains("total images:            1"));
        assert!(text.contains("errors:                  1"));
        assert!(text.contains("Bolsas: 1 products"));
        assert!(text.contains("variants: Negro, Beige"));
        assert!(text.contains("total images: 1"));
        assert!(text.contains("downloaded: 1"));
        assert!(text.contains("for variant Rojo: boom"));
    }

    #[test]
    fn dry_run_summary_omits_download_counts() {
        let text = render_summary(&result(true));
        assert!(text.contains("(dry run)"));
        assert!(!text.contains("downloaded:"));
    }
}
