use std::path::PathBuf;

/// Desktop Chrome user agent. The storefront serves reduced markup to
/// unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Clone)]
pub struct AppConfig {
    /// Storefront root, without trailing slash, e.g. `http://estudioartesana.local`.
    pub base_url: String,
    /// Path of the shop index page listing all categories.
    pub shop_path: String,
    /// Root directory for downloaded images and reports.
    pub output_dir: PathBuf,
    pub log_level: String,
    pub user_agent: String,
    pub page_timeout_secs: u64,
    pub download_timeout_secs: u64,
    /// Minimum spacing between any two HTTP requests, across all workers.
    pub inter_request_delay_ms: u64,
    pub max_concurrent_products: usize,
}

impl AppConfig {
    /// Absolute URL of the shop index page.
    #[must_use]
    pub fn shop_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.shop_path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("base_url", &self.base_url)
            .field("shop_path", &self.shop_path)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .field("page_timeout_secs", &self.page_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_concurrent_products", &self.max_concurrent_products)
            .finish_non_exhaustive()
    }
}
