use crate::app_config::{AppConfig, DEFAULT_USER_AGENT};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// config pointed at the local storefront.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let base_url = or_default("ARTESANA_BASE_URL", "http://estudioartesana.local");
    let base_url = base_url.trim_end_matches('/').to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ARTESANA_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{base_url}\""),
        });
    }

    let shop_path = or_default("ARTESANA_SHOP_PATH", "/tienda");
    let output_dir = PathBuf::from(or_default("ARTESANA_OUTPUT_DIR", "scraper"));
    let log_level = or_default("ARTESANA_LOG_LEVEL", "info");
    let user_agent = or_default("ARTESANA_USER_AGENT", DEFAULT_USER_AGENT);

    let page_timeout_secs = parse_u64("ARTESANA_PAGE_TIMEOUT_SECS", "30")?;
    let download_timeout_secs = parse_u64("ARTESANA_DOWNLOAD_TIMEOUT_SECS", "30")?;
    let inter_request_delay_ms = parse_u64("ARTESANA_INTER_REQUEST_DELAY_MS", "1000")?;
    let max_concurrent_products = parse_usize("ARTESANA_MAX_CONCURRENT_PRODUCTS", "4")?;

    if page_timeout_secs == 0 || download_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: if page_timeout_secs == 0 {
                "ARTESANA_PAGE_TIMEOUT_SECS"
            } else {
                "ARTESANA_DOWNLOAD_TIMEOUT_SECS"
            }
            .to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }

    Ok(AppConfig {
        base_url,
        shop_path,
        output_dir,
        log_level,
        user_agent,
        page_timeout_secs,
        download_timeout_secs,
        inter_request_delay_ms,
        max_concurrent_products,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
