use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::app_config::AppConfig;
use crate::{ConfigError, Credentials};

/// Production affiliate gateway endpoint.
pub const DEFAULT_GATEWAY_URL: &str = "https://api-sg.aliexpress.com/sync";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values count as unset for optional settings.
    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_price = |var: &str| -> Result<Option<Decimal>, ConfigError> {
        let Some(raw) = optional(var) else {
            return Ok(None);
        };
        let value = raw
            .trim()
            .parse::<Decimal>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })?;
        if value.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "price must not be negative".to_string(),
            });
        }
        Ok(Some(value))
    };

    let credentials = Credentials::new(
        require("AE_APP_KEY")?,
        require("AE_APP_SECRET")?,
        require("ALI_TRACKING_ID")?,
        require("AE_ACCESS_TOKEN")?,
    )?;

    let gateway_url = or_default("AEPUB_GATEWAY_URL", DEFAULT_GATEWAY_URL);
    let request_timeout_secs = parse_u64("AEPUB_REQUEST_TIMEOUT_SECS", "30")?;
    let log_level = or_default("AEPUB_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "AEPUB_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));

    let fetch_limit = parse_u32("AEPUB_FETCH_LIMIT", "20")?;
    if fetch_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "AEPUB_FETCH_LIMIT".to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }

    let min_price = parse_price("AEPUB_MIN_PRICE")?;
    let max_price = parse_price("AEPUB_MAX_PRICE")?;
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(ConfigError::InvalidEnvVar {
                var: "AEPUB_MAX_PRICE".to_string(),
                reason: format!("{max} is below AEPUB_MIN_PRICE {min}"),
            });
        }
    }

    let sent_products_path = PathBuf::from(or_default(
        "AEPUB_SENT_PRODUCTS_PATH",
        "./data/sent_products.json",
    ));
    let dedup_ttl_secs = parse_u64("AEPUB_DEDUP_TTL_SECS", "604800")?;
    let post_prefix = or_default("AEPUB_POST_PREFIX", "🔥 Deal of the day");

    Ok(AppConfig {
        credentials,
        gateway_url,
        request_timeout_secs,
        log_level,
        categories_path,
        fetch_limit,
        min_price,
        max_price,
        sent_products_path,
        dedup_ttl_secs,
        post_prefix,
        telegram_bot_token: optional("TELEGRAM_BOT_TOKEN"),
        telegram_channel_id: optional("TELEGRAM_CHANNEL_ID"),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
