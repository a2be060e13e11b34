//! JSON and CSV reports for a finished run.
//!
//! The JSON report is the full [`ScrapeResult`]. The CSV flattens it to one
//! row per variant for spreadsheet use, so it is written with a UTF-8 byte
//! order mark.

use std::path::{Path, PathBuf};

use artesana_core::ScrapeResult;
use serde::Serialize;

use crate::atomic_write::write_atomic;
use crate::error::ScraperError;
use crate::naming::{extract_price, sanitize_component};

pub const JSON_REPORT_FILE: &str = "scraping_report.json";
pub const CSV_REPORT_FILE: &str = "productos_scrapeados.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const LIST_SEPARATOR: &str = " | ";

/// One CSV row: a single variant of a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantRow {
    #[serde(rename = "categoria")]
    pub category_name: String,
    #[serde(rename = "categoria_slug")]
    pub category_slug: String,
    #[serde(rename = "producto")]
    pub product_name: String,
    #[serde(rename = "producto_slug")]
    pub product_slug: String,
    #[serde(rename = "variante")]
    pub variant: String,
    /// Price found in the raw product name, empty when absent.
    #[serde(rename = "precio")]
    pub price: String,
    #[serde(rename = "total_imagenes")]
    pub candidate_count: usize,
    #[serde(rename = "imagenes_descargadas")]
    pub downloaded_count: usize,
    #[serde(rename = "urls_imagenes")]
    pub candidate_urls: String,
    #[serde(rename = "rutas_descargadas")]
    pub downloaded_paths: String,
}

/// Locations of the written reports. `csv` is `None` when there were no rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub csv: Option<PathBuf>,
}

/// Flattens a run into one row per variant.
#[must_use]
pub fn variant_rows(result: &ScrapeResult) -> Vec<VariantRow> {
    let mut rows = Vec::new();
    for category in &result.categories {
        for report in &category.products {
            let price = extract_price(&report.product.name);
            for (label, candidates) in report.variants.iter() {
                let stem = sanitize_component(label);
                let paths: Vec<&str> = report
                    .downloaded_images
                    .iter()
                    .map(String::as_str)
                    .filter(|p| Path::new(p).file_stem().is_some_and(|s| s.to_string_lossy() == stem))
                    .collect();
                rows.push(VariantRow {
                    category_name: category.category.name.clone(),
                    category_slug: category.category.slug.clone(),
                    product_name: report.product.name.clone(),
                    product_slug: report.product.slug.clone(),
                    variant: label.to_string(),
                    price: price.clone(),
                    candidate_count: candidates.len(),
                    downloaded_count: paths.len(),
                    candidate_urls: candidates.join(LIST_SEPARATOR),
                    downloaded_paths: paths.join(LIST_SEPARATOR),
                });
            }
        }
    }
    rows
}

/// Writes the full result as indented UTF-8 JSON.
///
/// # Errors
///
/// Returns [`ScraperError::Serialize`] or [`ScraperError::Io`].
pub async fn write_json_report(result: &ScrapeResult, path: &Path) -> Result<(), ScraperError> {
    let mut body = serde_json::to_vec_pretty(result).map_err(|e| ScraperError::Serialize {
        context: "scrape result".to_string(),
        source: e,
    })?;
    body.push(b'\n');
    write_atomic(path, &body).await
}

/// Writes the per-variant CSV with a BOM and header row. Returns the number
/// of data rows; nothing is written when there are none.
///
/// # Errors
///
/// Returns [`ScraperError::Csv`] or [`ScraperError::Io`].
pub async fn write_csv_report(result: &ScrapeResult, path: &Path) -> Result<usize, ScraperError> {
    let rows = variant_rows(result);
    if rows.is_empty() {
        tracing::warn!(path = %path.display(), "no variant rows; CSV report not written");
        return Ok(0);
    }

    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for row in &rows {
        writer.serialize(row)?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| ScraperError::io(path, e.into_error()))?;
    write_atomic(path, &body).await?;
    Ok(rows.len())
}

/// Writes both reports under `root`.
///
/// # Errors
///
/// Propagates the first failure from either writer.
pub async fn write_reports(result: &ScrapeResult, root: &Path) -> Result<ReportPaths, ScraperError> {
    let json = root.join(JSON_REPORT_FILE);
    write_json_report(result, &json).await?;
    tracing::info!(path = %json.display(), "JSON report written");

    let csv_path = root.join(CSV_REPORT_FILE);
    let rows = write_csv_report(result, &csv_path).await?;
    let csv = (rows > 0).then(|| {
        tracing::info!(path = %csv_path.display(), rows, "CSV report written");
        csv_path
    });

    Ok(ReportPaths { json, csv })
}

#[cfg(test)]
mod tests {
    use artesana_core::{
        Category, CategoryReport, Product, ProductReport, ResolutionStatus, VariantMap,
    };

    use super::*;

    fn sample_result() -> ScrapeResult {
        let mut variants = VariantMap::new();
        variants.insert(
            "Negro",
            vec![
                "http://shop.test/wp-content/uploads/negro.jpg".to_string(),
                "http://shop.test/wp-content/uploads/negro-2.jpg".to_string(),
            ],
        );
        variants.insert("Café/Claro", vec!["http://shop.test/wp-content/uploads/cafe.jpg".to_string()]);
        variants.insert("Beige", Vec::new());

        let mut result = ScrapeResult::new("http://shop.test", false);
        result.push_category(
            CategoryReport {
                category: Category {
                    name: "Bolsas".to_string(),
                    slug: "bolsas".to_string(),
                    url: "http://shop.test/product-category/bolsas/".to_string(),
                },
                products: vec![ProductReport {
                    product: Product {
                        name: "Bolsa Tejida MXN $480.00".to_string(),
                        slug: "bolsa-tejida".to_string(),
                        url: "http://shop.test/product/bolsa-tejida/".to_string(),
                        category_slug: "bolsas".to_string(),
                    },
                    resolution: ResolutionStatus::Found,
                    main_image: Some("http://shop.test/wp-content/uploads/main.jpg".to_string()),
                    variants,
                    downloads: Vec::new(),
                    downloaded_images: vec![
                        "scraper/Bolsas/Bolsa Tejida/principal.jpg".to_string(),
                        "scraper/Bolsas/Bolsa Tejida/Negro.jpg".to_string(),
                        "scraper/Bolsas/Bolsa Tejida/Café_Claro.jpg".to_string(),
                    ],
                    downloaded_image_count: 3,
                }],
            },
            Vec::new(),
        );
        result
    }

    #[test]
    fn one_row_per_variant_with_price_and_matching_paths() {
        let rows = variant_rows(&sample_result());
        assert_eq!(rows.len(), 3);

        let negro = &rows[0];
        assert_eq!(negro.variant, "Negro");
        assert_eq!(negro.price, "MXN $480.00");
        assert_eq!(negro.product_name, "Bolsa Tejida MXN $480.00");
        assert_eq!(negro.candidate_count, 2);
        assert_eq!(negro.downloaded_count, 1);
        assert_eq!(
            negro.candidate_urls,
            "http://shop.test/wp-content/uploads/negro.jpg | http://shop.test/wp-content/uploads/negro-2.jpg"
        );
        assert_eq!(negro.downloaded_paths, "scraper/Bolsas/Bolsa Tejida/Negro.jpg");

        // Sanitized label matches the downloaded file stem.
        assert_eq!(rows[1].downloaded_count, 1);

        let beige = &rows[2];
        assert_eq!(beige.candidate_count, 0);
        assert_eq!(beige.downloaded_count, 0);
        assert_eq!(beige.downloaded_paths, "");
    }

    #[tokio::test]
    async fn csv_has_bom_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CSV_REPORT_FILE);
        let written = write_csv_report(&sample_result(), &path).await.unwrap();
        assert_eq!(written, 3);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("categoria,categoria_slug,producto,producto_slug,variante,precio,total_imagenes,imagenes_descargadas,urls_imagenes,rutas_descargadas")
        );
        assert_eq!(lines.count(), 3);
    }

    #[tokio::test]
    async fn csv_skipped_when_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CSV_REPORT_FILE);
        let result = ScrapeResult::new("http://shop.test", true);
        assert_eq!(write_csv_report(&result, &path).await.unwrap(), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn json_report_is_indented_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_reports(&sample_result(), dir.path()).await.unwrap();

        let text = std::fs::read_to_string(&paths.json).unwrap();
        assert!(text.contains("\n  \"base_url\""));
        assert!(text.contains("Café/Claro"), "non-ASCII must not be escaped");

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_products"], 1);
        assert_eq!(value["categories"][0]["products"][0]["slug"], "bolsa-tejida");
        assert_eq!(paths.csv, Some(dir.path().join(CSV_REPORT_FILE)));
    }
}
