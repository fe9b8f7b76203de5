use aepub_core::Product;
use serde_json::Value;

use super::AffiliateClient;
use crate::envelope::{decode_embedded_json, locate_result};
use crate::extract::first_text;
use crate::sign::ParamValue;

pub const LINK_GENERATE_METHOD: &str = "aliexpress.affiliate.link.generate";

const SHORT_URL_ALIASES: &[&str] = &["promotion_url", "promotion_link", "promotionUrl"];

/// Result of asking the gateway for an affiliate link.
///
/// Both variants carry a usable URL: a failed generation degrades to the
/// caller's original URL and never to an empty or fabricated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The gateway produced a tracking link distinct from the input.
    Shortened(String),
    /// Generation failed or produced nothing new; `original` is the input.
    Degraded { original: String, reason: String },
}

impl LinkOutcome {
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            LinkOutcome::Shortened(url) => url,
            LinkOutcome::Degraded { original, .. } => original,
        }
    }

    #[must_use]
    pub fn into_url(self) -> String {
        match self {
            LinkOutcome::Shortened(url) => url,
            LinkOutcome::Degraded { original, .. } => original,
        }
    }

    #[must_use]
    pub fn is_shortened(&self) -> bool {
        matches!(self, LinkOutcome::Shortened(_))
    }
}

impl AffiliateClient {
    /// Returns an affiliate link for `url`, or `url` itself if none could be
    /// generated.
    pub async fn generate_affiliate_link(&self, url: &str) -> String {
        self.resolve_link(url).await.into_url()
    }

    /// Asks the gateway to convert `url` into a tracking link.
    ///
    /// Degrades to the original URL when the call fails, the gateway reports
    /// an error, no promotion link comes back, the link is empty, or it is
    /// identical to `url`.
    pub async fn resolve_link(&self, url: &str) -> LinkOutcome {
        let degraded = |reason: String| {
            tracing::warn!(url, %reason, "affiliate link not generated; keeping original URL");
            LinkOutcome::Degraded {
                original: url.to_owned(),
                reason,
            }
        };

        let params = [
            ("urls", Some(ParamValue::from(url))),
            ("tracking_id", Some(ParamValue::from(self.tracking_id()))),
            ("promotion_link_type", Some(ParamValue::Integer(0))),
        ];

        let raw = match self.request(LINK_GENERATE_METHOD, &params).await {
            Ok(raw) => decode_embedded_json(raw),
            Err(err) => return degraded(err.to_string()),
        };

        let result = match locate_result(&raw, LINK_GENERATE_METHOD) {
            Ok(result) => result,
            Err(err) => return degraded(err.to_string()),
        };

        match first_promotion_url(result) {
            None => degraded("gateway returned no promotion link".to_string()),
            Some(short) if short == url.trim() => {
                degraded("promotion link is identical to the input URL".to_string())
            }
            Some(short) => {
                tracing::info!(url, short_url = %short, "affiliate link generated");
                LinkOutcome::Shortened(short)
            }
        }
    }

    /// Returns the best shareable link for `product`.
    ///
    /// A promotion link already attached at search time is returned without
    /// a network call. A product with no canonical URL yields `None`.
    pub async fn ensure_short_link(&self, product: &Product) -> Option<String> {
        if let Some(existing) = product
            .promotion_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
        {
            return Some(existing.to_owned());
        }

        if product.url.trim().is_empty() {
            return None;
        }

        Some(self.generate_affiliate_link(&product.url).await)
    }
}

/// Reads the short URL from the first `promotion_links` entry.
///
/// The collection arrives as a list, as a single entry object, or wrapped
/// as `{"promotion_link": [...]}`; all are reduced to "first entry".
fn first_promotion_url(result: &Value) -> Option<String> {
    let links = result.get("promotion_links")?;
    let first = match links {
        Value::Array(entries) => entries.first()?,
        Value::Object(obj) => match obj.get("promotion_link") {
            Some(Value::Array(entries)) => entries.first()?,
            Some(inner @ Value::Object(_)) => inner,
            _ => links,
        },
        _ => return None,
    };
    first_text(first, SHORT_URL_ALIASES)
}
