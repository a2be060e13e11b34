pub mod atomic_write;
pub mod client;
pub mod discovery;
pub mod download;
pub mod error;
mod html;
pub mod naming;
pub mod rate_limit;
pub mod report;
pub mod resolver;

pub use client::StorefrontClient;
pub use discovery::{discover_categories, discover_products, parse_categories, parse_products};
pub use download::{plan_downloads, DedupCache, MaterializedProduct, Materializer};
pub use error::ScraperError;
pub use naming::{clean_product_name, extract_price, sanitize_component};
pub use report::{write_reports, ReportPaths};
pub use resolver::{resolve_document, resolve_product, Resolution};
