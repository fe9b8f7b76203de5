use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::Credentials;

#[derive(Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub gateway_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub categories_path: PathBuf,
    /// Page size requested from the product search endpoint.
    pub fetch_limit: u32,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sent_products_path: PathBuf,
    /// A product is not republished within this many seconds.
    pub dedup_ttl_secs: u64,
    pub post_prefix: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_channel_id: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("credentials", &self.credentials)
            .field("gateway_url", &self.gateway_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("fetch_limit", &self.fetch_limit)
            .field("min_price", &self.min_price)
            .field("max_price", &self.max_price)
            .field("sent_products_path", &self.sent_products_path)
            .field("dedup_ttl_secs", &self.dedup_ttl_secs)
            .field("post_prefix", &self.post_prefix)
            .field(
                "telegram_bot_token",
                &self.telegram_bot_token.as_ref().map(|_| "[redacted]"),
            )
            .field("telegram_channel_id", &self.telegram_channel_id)
            .finish()
    }
}
