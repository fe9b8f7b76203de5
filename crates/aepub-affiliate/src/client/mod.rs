//! HTTP client for the affiliate gateway.
//!
//! Wraps `reqwest` with request signing and the gateway's single-endpoint
//! GET protocol. The transport layer never retries; search and link
//! resolution degrade to safe results instead of surfacing failures.

mod link;
mod search;

use std::time::Duration;

use aepub_core::{AppConfig, Credentials, DEFAULT_GATEWAY_URL};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::AffiliateError;
use crate::sign::{sign, ParamValue, SIGN_PARAM};

pub use link::{LinkOutcome, LINK_GENERATE_METHOD};
pub use search::PRODUCT_QUERY_METHOD;

const SIGN_METHOD: &str = "sha256";

/// Client for the affiliate gateway.
///
/// Holds immutable credentials and a shared `reqwest::Client`; carries no
/// per-call state, so one instance can serve concurrent callers. Use
/// [`AffiliateClient::new`] for production or
/// [`AffiliateClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct AffiliateClient {
    client: Client,
    credentials: Credentials,
    base_url: Url,
}

impl AffiliateClient {
    /// Creates a client pointed at the production gateway.
    ///
    /// # Errors
    ///
    /// Returns [`AffiliateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(credentials: &Credentials, timeout_secs: u64) -> Result<Self, AffiliateError> {
        Self::with_base_url(credentials, timeout_secs, DEFAULT_GATEWAY_URL)
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// Same as [`AffiliateClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, AffiliateError> {
        Self::with_base_url(
            &config.credentials,
            config.request_timeout_secs,
            &config.gateway_url,
        )
    }

    /// Creates a client with a custom gateway URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AffiliateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AffiliateError::Configuration`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        credentials: &Credentials,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AffiliateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("aepub/0.1 (affiliate-publisher)")
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| {
            AffiliateError::Configuration(aepub_core::ConfigError::InvalidEnvVar {
                var: "AEPUB_GATEWAY_URL".to_string(),
                reason: format!("invalid gateway URL '{base_url}': {e}"),
            })
        })?;

        Ok(Self {
            client,
            credentials: credentials.clone(),
            base_url,
        })
    }

    #[must_use]
    pub fn tracking_id(&self) -> &str {
        self.credentials.tracking_id()
    }

    /// Calls a gateway method and returns the decoded JSON body unchanged.
    ///
    /// A body that is itself a JSON-encoded string is passed through as a
    /// string; callers re-parse it with
    /// [`crate::envelope::decode_embedded_json`].
    ///
    /// # Errors
    ///
    /// - [`AffiliateError::Http`] on network failure or timeout.
    /// - [`AffiliateError::UnexpectedStatus`] on a non-2xx status.
    /// - [`AffiliateError::Deserialize`] if the body is not valid JSON.
    pub async fn request(
        &self,
        method: &str,
        params: &[(&str, Option<ParamValue>)],
    ) -> Result<Value, AffiliateError> {
        let url = self.signed_url(method, params, chrono::Utc::now().timestamp_millis());
        tracing::debug!(method, "calling affiliate gateway");

        // The signed URL carries the access token; keep it out of error text.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AffiliateError::Http(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AffiliateError::UnexpectedStatus {
                status: status.as_u16(),
                method: method.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AffiliateError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| AffiliateError::Deserialize {
            context: method.to_owned(),
            source: e,
        })
    }

    /// Builds the signed request URL.
    ///
    /// Common parameters come first; call-specific parameters replace a
    /// common one on key collision. Entries with a `None` value are neither
    /// signed nor sent, and a caller-supplied `sign` entry is discarded.
    fn signed_url(
        &self,
        method: &str,
        params: &[(&str, Option<ParamValue>)],
        timestamp_ms: i64,
    ) -> Url {
        let mut merged: Vec<(&str, Option<ParamValue>)> = vec![
            ("app_key", Some(self.credentials.app_key().into())),
            ("access_token", Some(self.credentials.access_token().into())),
            ("timestamp", Some(ParamValue::Integer(timestamp_ms))),
            ("sign_method", Some(SIGN_METHOD.into())),
            ("method", Some(method.into())),
        ];

        for (key, value) in params.iter().filter(|(key, _)| *key != SIGN_PARAM) {
            match merged.iter_mut().find(|(existing, _)| existing == key) {
                Some(slot) => slot.1.clone_from(value),
                None => merged.push((*key, value.clone())),
            }
        }

        let signature = sign(
            merged.iter().map(|(key, value)| (*key, value.as_ref())),
            self.credentials.app_secret(),
        );

        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &merged {
                if let Some(value) = value {
                    pairs.append_pair(key, &value.to_string());
                }
            }
            pairs.append_pair(SIGN_PARAM, &signature);
        }
        url
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
