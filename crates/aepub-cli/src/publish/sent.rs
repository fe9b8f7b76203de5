//! JSON-file record of recently published product IDs.
//!
//! Shape: `{"products": [{"id": "...", "last_sent_ts": 1700000000}]}`.
//! The file is rewritten in full on every change; concurrent writers are
//! not supported.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entries older than this many TTLs are pruned by `cleanup_older_than`.
const RETENTION_TTL_MULTIPLIER: i64 = 4;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access sent-products file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize sent-products file: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SentFile {
    #[serde(default)]
    products: Vec<SentEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SentEntry {
    id: String,
    last_sent_ts: i64,
}

#[derive(Debug)]
pub struct SentProductsStore {
    path: PathBuf,
    data: SentFile,
}

impl SentProductsStore {
    /// Opens the store at `path`, creating the file if it does not exist.
    ///
    /// An unreadable or corrupt file is replaced by an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file or its parent directory cannot
    /// be written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "sent-products file is corrupt; starting empty"
                );
                SentFile::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SentFile::default(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "sent-products file is unreadable; starting empty"
                );
                SentFile::default()
            }
        };

        let store = Self { path, data };
        store.save()?;
        Ok(store)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.products.is_empty()
    }

    /// Records `product_id` as published now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn mark_sent(&mut self, product_id: &str) -> Result<(), StoreError> {
        self.mark_sent_at(product_id, now_ts())
    }

    fn mark_sent_at(&mut self, product_id: &str, ts: i64) -> Result<(), StoreError> {
        match self.data.products.iter_mut().find(|p| p.id == product_id) {
            Some(entry) => entry.last_sent_ts = ts,
            None => self.data.products.push(SentEntry {
                id: product_id.to_owned(),
                last_sent_ts: ts,
            }),
        }
        self.save()
    }

    /// Returns `true` if `product_id` was published within `ttl_secs`.
    #[must_use]
    pub fn was_sent_recently(&self, product_id: &str, ttl_secs: u64) -> bool {
        self.was_sent_recently_at(product_id, ttl_secs, now_ts())
    }

    fn was_sent_recently_at(&self, product_id: &str, ttl_secs: u64, now: i64) -> bool {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        self.data
            .products
            .iter()
            .find(|p| p.id == product_id)
            .is_some_and(|p| now.saturating_sub(p.last_sent_ts) <= ttl)
    }

    /// Drops entries older than four times `ttl_secs` and returns how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub fn cleanup_older_than(&mut self, ttl_secs: u64) -> Result<usize, StoreError> {
        self.cleanup_older_than_at(ttl_secs, now_ts())
    }

    fn cleanup_older_than_at(&mut self, ttl_secs: u64, now: i64) -> Result<usize, StoreError> {
        let retention = i64::try_from(ttl_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(RETENTION_TTL_MULTIPLIER);
        let before = self.data.products.len();
        self.data
            .products
            .retain(|p| now.saturating_sub(p.last_sent_ts) <= retention);
        let removed = before - self.data.products.len();
        if removed > 0 {
            tracing::debug!(removed, "pruned old sent-product entries");
        }
        self.save()?;
        Ok(removed)
    }

    fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}
