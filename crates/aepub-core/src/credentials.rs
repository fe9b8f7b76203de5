use crate::ConfigError;

/// Affiliate gateway credentials.
///
/// Validated once at construction and immutable afterwards; the fields are
/// private so an instance can never hold an empty value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    app_key: String,
    app_secret: String,
    tracking_id: String,
    access_token: String,
}

impl Credentials {
    /// Builds a credential set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredential`] naming the first value that
    /// is empty or whitespace-only.
    pub fn new(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        tracking_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let credentials = Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            tracking_id: tracking_id.into(),
            access_token: access_token.into(),
        };

        for (name, value) in [
            ("app_key", &credentials.app_key),
            ("app_secret", &credentials.app_secret),
            ("tracking_id", &credentials.tracking_id),
            ("access_token", &credentials.access_token),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyCredential(name));
            }
        }

        Ok(credentials)
    }

    #[must_use]
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    #[must_use]
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    #[must_use]
    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"[redacted]")
            .field("tracking_id", &self.tracking_id)
            .field("access_token", &"[redacted]")
            .finish()
    }
}
