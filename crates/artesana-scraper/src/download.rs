//! Download materializer: turns resolved variant imagery into files.
//!
//! Layout under the output root:
//!
//! ```text
//! <root>/<Category>/<Product>/principal.<ext>
//! <root>/<Category>/<Product>/<Variant>.<ext>
//! ```
//!
//! Every component is sanitized on its own. Downloads are idempotent at two
//! levels: a URL is fetched at most once per run ([`DedupCache`]) and an
//! existing destination file is never re-fetched, which makes re-runs resume
//! where the previous run stopped. Destinations are claimed one writer at a
//! time, so products that map to the same folder behave as if processed in
//! order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use artesana_core::{Category, DownloadOutcome, DownloadRecord, Product, VariantImageSet};
use tokio::sync::{Mutex as AsyncMutex, OnceCell};

use crate::atomic_write::write_atomic;
use crate::client::{path_extension, StorefrontClient};
use crate::error::ScraperError;
use crate::naming::{clean_product_name, sanitize_component};

const MAIN_IMAGE_STEM: &str = "principal";
const FALLBACK_EXTENSION: &str = ".jpg";

/// Where a URL ended up, or why it could not be fetched.
type CachedFetch = Result<PathBuf, String>;

/// Run-scoped record of every source URL and destination the materializer
/// has handled.
///
/// Each URL gets a once-cell: the first caller performs the fetch while
/// concurrent callers for the same URL wait for its result, so a URL is
/// requested at most once per run even across workers. Each destination gets
/// a lock held for the whole download, so a path is written by one worker
/// and later workers find the file in place.
#[derive(Debug, Default)]
pub struct DedupCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<CachedFetch>>>>,
    destinations: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl DedupCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, url: &str) -> Arc<OnceCell<CachedFetch>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(url.to_owned()).or_default())
    }

    fn destination_lock(&self, dest: &Path) -> Arc<AsyncMutex<()>> {
        let mut destinations = self
            .destinations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(destinations.entry(dest.to_path_buf()).or_default())
    }

    /// Location the URL was materialized at, if it was.
    #[must_use]
    pub fn materialized_path(&self, url: &str) -> Option<PathBuf> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(url)
            .and_then(|cell| cell.get())
            .and_then(|fetch| fetch.as_ref().ok().cloned())
    }

    /// `true` once the URL has been downloaded or confirmed on disk.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.materialized_path(url).is_some()
    }

    /// Number of URLs successfully materialized.
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .filter(|cell| matches!(cell.get(), Some(Ok(_))))
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a planned download is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    MainImage,
    Variant(String),
}

/// One file the materializer intends to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDownload {
    pub target: DownloadTarget,
    pub source_url: String,
    pub destination: PathBuf,
}

/// Records and escalated errors for one product.
#[derive(Debug, Default)]
pub struct MaterializedProduct {
    pub downloads: Vec<DownloadRecord>,
    pub errors: Vec<String>,
}

impl MaterializedProduct {
    /// Destination paths of successful downloads, in attempt order.
    #[must_use]
    pub fn downloaded_paths(&self) -> Vec<String> {
        self.downloads
            .iter()
            .filter(|r| r.outcome.is_success())
            .map(|r| r.destination_path.clone())
            .collect()
    }
}

/// Directory holding one product's images.
///
/// Falls back to the product slug when the cleaned name sanitizes to nothing
/// (e.g. a name that was only a price).
#[must_use]
pub fn product_dir(root: &Path, category: &Category, product: &Product) -> PathBuf {
    let mut product_component = sanitize_component(&clean_product_name(&product.name));
    if product_component.is_empty() {
        product_component = sanitize_component(&product.slug);
    }
    root.join(sanitize_component(&category.name))
        .join(product_component)
}

fn file_name(stem: &str, url: &str) -> String {
    let ext = path_extension(url).unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{stem}{ext}")
}

/// Deterministic list of downloads for one product: the main image first,
/// then the first candidate of each variant in map order. Variants without
/// candidates are skipped.
#[must_use]
pub fn plan_downloads(
    root: &Path,
    category: &Category,
    product: &Product,
    images: &VariantImageSet,
) -> Vec<PlannedDownload> {
    let dir = product_dir(root, category, product);
    let mut plan = Vec::new();

    if let Some(url) = &images.main_image {
        plan.push(PlannedDownload {
            target: DownloadTarget::MainImage,
            source_url: url.clone(),
            destination: dir.join(file_name(MAIN_IMAGE_STEM, url)),
        });
    }

    for (label, candidates) in images.variants.iter() {
        let Some(url) = candidates.first() else {
            continue;
        };
        plan.push(PlannedDownload {
            target: DownloadTarget::Variant(label.to_string()),
            source_url: url.clone(),
            destination: dir.join(file_name(&sanitize_component(label), url)),
        });
    }
    plan
}

/// Executes download plans against the storefront.
#[derive(Clone)]
pub struct Materializer {
    client: StorefrontClient,
    root: PathBuf,
    cache: Arc<DedupCache>,
}

impl Materializer {
    #[must_use]
    pub fn new(client: StorefrontClient, root: impl Into<PathBuf>, cache: Arc<DedupCache>) -> Self {
        Self {
            client,
            root: root.into(),
            cache,
        }
    }

    /// Downloads one product's main image and per-variant images.
    ///
    /// Failed downloads are recorded and reported in `errors`; they never
    /// stop the remaining downloads.
    pub async fn materialize(
        &self,
        category: &Category,
        product: &Product,
        images: &VariantImageSet,
    ) -> MaterializedProduct {
        let mut result = MaterializedProduct::default();

        for planned in plan_downloads(&self.root, category, product, images) {
            let outcome = match self.download(&planned.source_url, &planned.destination).await {
                Ok(outcome) => {
                    tracing::debug!(
                        url = %planned.source_url,
                        path = %planned.destination.display(),
                        ?outcome,
                        "image materialized"
                    );
                    outcome
                }
                Err(e) => {
                    tracing::warn!(
                        product = %product.slug,
                        url = %planned.source_url,
                        error = %e,
                        "image download failed"
                    );
                    result.errors.push(match &planned.target {
                        DownloadTarget::MainImage => {
                            format!("error downloading main image {}: {e}", planned.source_url)
                        }
                        DownloadTarget::Variant(label) => format!(
                            "error downloading {} for variant {label}: {e}",
                            planned.source_url
                        ),
                    });
                    DownloadOutcome::Failed
                }
            };
            result.downloads.push(DownloadRecord {
                source_url: planned.source_url,
                destination_path: planned.destination.display().to_string(),
                outcome,
            });
        }
        result
    }

    /// Materializes `url` at `dest`.
    ///
    /// An existing `dest` is always a success without a request, even for a
    /// URL that failed earlier. Otherwise no request is issued when the URL
    /// was already handled in this run: a URL materialized elsewhere is copied
    /// locally to `dest`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] / [`ScraperError::Http`] if the fetch failed.
    /// - [`ScraperError::Io`] if the file could not be written or copied.
    /// - [`ScraperError::AlreadyFailed`] if an earlier attempt for this URL failed.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome, ScraperError> {
        // Destination lock first, URL cell second; a fetch in progress never
        // waits on a destination, so the two cannot deadlock.
        let destination = self.cache.destination_lock(dest);
        let _claim = destination.lock().await;

        let slot = self.cache.slot(url);
        if file_exists(dest).await {
            tracing::debug!(path = %dest.display(), "already on disk; skipping fetch");
            // Remembered as this URL's copy unless the URL is already settled.
            let _ = slot.set(Ok(dest.to_path_buf()));
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        // Set only when this call performed the fetch; waiters read the cell.
        let mut fresh: Option<Result<DownloadOutcome, ScraperError>> = None;
        let fresh_slot = &mut fresh;
        let cached = slot
            .get_or_init(|| async move {
                let result = self.fetch_to(url, dest).await;
                let cached = match &result {
                    Ok(_) => Ok(dest.to_path_buf()),
                    Err(e) => Err(e.to_string()),
                };
                *fresh_slot = Some(result);
                cached
            })
            .await;

        match fresh {
            Some(result) => result,
            None => reuse(url, dest, cached).await,
        }
    }

    async fn fetch_to(&self, url: &str, dest: &Path) -> Result<DownloadOutcome, ScraperError> {
        let bytes = self.client.fetch_bytes(url).await?;
        write_atomic(dest, &bytes).await?;
        Ok(DownloadOutcome::Downloaded)
    }
}

/// Serves a URL already handled in this run without touching the network.
/// Called with `dest` known to be absent.
async fn reuse(url: &str, dest: &Path, cached: &CachedFetch) -> Result<DownloadOutcome, ScraperError> {
    let source = cached.as_ref().map_err(|reason| ScraperError::AlreadyFailed {
        url: url.to_owned(),
        reason: reason.clone(),
    })?;
    if source.as_path() != dest {
        let bytes = tokio::fs::read(source)
            .await
            .map_err(|e| ScraperError::io(source, e))?;
        write_atomic(dest, &bytes).await?;
        tracing::debug!(
            from = %source.display(),
            to = %dest.display(),
            "reused image fetched earlier in this run"
        );
    }
    Ok(DownloadOutcome::AlreadyPresent)
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use artesana_core::VariantMap;

    use super::*;

    fn category(name: &str) -> Category {
        Category {
            name: name.to_string(),
            slug: "bolsas".to_string(),
            url: "http://shop.test/product-category/bolsas/".to_string(),
        }
    }

    fn product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            slug: "bolsa-tejida".to_string(),
            url: "http://shop.test/product/bolsa-tejida/".to_string(),
            category_slug: "bolsas".to_string(),
        }
    }

    #[test]
    fn product_dir_sanitizes_each_component() {
        let dir = product_dir(
            Path::new("scraper"),
            &category("Bolsas: Mano/Hombro"),
            &product("Bolsa \"Tejida\" MXN $480.00"),
        );
        assert_eq!(
            dir,
            Path::new("scraper")
                .join("Bolsas_ Mano_Hombro")
                .join("Bolsa _Tejida_")
        );
    }

    #[test]
    fn product_dir_falls_back_to_slug_for_price_only_name() {
        let dir = product_dir(Path::new("out"), &category("Bolsas"), &product("MXN $480.00"));
        assert_eq!(dir, Path::new("out").join("Bolsas").join("bolsa-tejida"));
    }

    #[test]
    fn plan_orders_main_then_variants_and_skips_empty() {
        let mut variants = VariantMap::new();
        variants.insert(
            "Negro/Mate",
            vec![
                "http://shop.test/wp-content/uploads/negro.png".to_string(),
                "http://shop.test/wp-content/uploads/negro-2.png".to_string(),
            ],
        );
        variants.insert("Beige", Vec::new());
        variants.insert("Rojo", vec!["http://shop.test/image/rojo".to_string()]);
        let images = VariantImageSet {
            main_image: Some("http://shop.test/wp-content/uploads/main.webp?v=1".to_string()),
            variants,
        };

        let plan = plan_downloads(Path::new("scraper"), &category("Bolsas"), &product("Tote"), &images);
        let dir = Path::new("scraper").join("Bolsas").join("Tote");

        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].target, DownloadTarget::MainImage);
        assert_eq!(plan[0].destination, dir.join("principal.webp"));
        assert_eq!(plan[1].target, DownloadTarget::Variant("Negro/Mate".to_string()));
        assert_eq!(plan[1].source_url, "http://shop.test/wp-content/uploads/negro.png");
        assert_eq!(plan[1].destination, dir.join("Negro_Mate.png"));
        assert_eq!(plan[2].destination, dir.join("Rojo.jpg"));
    }

    #[test]
    fn plan_is_empty_for_default_only_set() {
        let plan = plan_downloads(
            Path::new("scraper"),
            &category("Bolsas"),
            &product("Tote"),
            &VariantImageSet::empty(),
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn dedup_cache_starts_empty() {
        let cache = DedupCache::new();
        assert!(cache.is_empty());
        assert!(!cache.contains("http://shop.test/a.jpg"));
    }
}
