use std::path::PathBuf;
use thiserror::Error;

/// Central error type for host product detection.
/// Every module returns `Result<T, HostError>`.
#[derive(Debug, Error)]
pub enum HostError {
    // ── Catalog ─────────────────────────────────────────
    #[error("Product catalog unavailable at {path:?}: {reason}")]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("No known product matches {0:?}")]
    ProductNotFound(String),

    // ── Binary metadata ─────────────────────────────────
    #[error("No readable version metadata in {path:?}: {reason}")]
    MetadataUnreadable { path: PathBuf, reason: String },

    // ── Installation registry ───────────────────────────
    #[error("Failed reading registry entry '{key}': {reason}")]
    RegistryEntry { key: String, reason: String },

    #[error("Installation registry unavailable: {0}")]
    RegistryUnavailable(String),

    // ── Parsing ─────────────────────────────────────────
    #[error("Invalid product version: {0:?}")]
    InvalidVersion(String),

    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Scan ────────────────────────────────────────────
    #[error("Installation scan did not finish within {0}s")]
    Timeout(u64),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type HostResult<T> = Result<T, HostError>;

impl From<std::io::Error> for HostError {
    fn from(source: std::io::Error) -> Self {
        HostError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

// ── Serialization for JSON output ───────────────────────
// Errors are reported to callers as their display message.
impl serde::Serialize for HostError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
