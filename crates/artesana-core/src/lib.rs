pub mod app_config;
pub mod catalog;
pub mod config;
pub mod results;
pub mod variants;

pub use app_config::AppConfig;
pub use catalog::{Category, Product};
pub use config::{load_app_config, load_app_config_from_env};
pub use results::{
    CategoryReport, DownloadOutcome, DownloadRecord, ProductReport, ResolutionStatus,
    ScrapeResult,
};
pub use variants::{VariantImageSet, VariantMap, DEFAULT_VARIANT};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
