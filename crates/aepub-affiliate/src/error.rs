use thiserror::Error;

/// Errors returned by the affiliate gateway client.
#[derive(Debug, Error)]
pub enum AffiliateError {
    /// Client construction was attempted with unusable settings.
    #[error("configuration error: {0}")]
    Configuration(#[from] aepub_core::ConfigError),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {method}")]
    UnexpectedStatus { status: u16, method: String },

    /// The response body could not be decoded as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The gateway answered 2xx but its body carries an error object.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// The body lacks the `<namespace>_response` / `resp_result` envelope.
    #[error("malformed gateway response for {method}: {reason}")]
    MalformedResponse { method: String, reason: String },
}
