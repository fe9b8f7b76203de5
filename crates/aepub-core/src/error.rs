use thiserror::Error;

/// Errors raised while assembling configuration or credentials.
///
/// Every variant is fatal at startup: nothing downstream substitutes a
/// default for a missing credential.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    /// A credential was supplied but is empty or whitespace-only.
    #[error("credential `{0}` must not be empty")]
    EmptyCredential(&'static str),

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("categories validation failed: {0}")]
    Validation(String),
}
