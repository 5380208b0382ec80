//! Error types for the revocation registry.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for registry operations.
pub type RevocationResult<T> = Result<T, RevocationError>;

/// Errors that can occur while reading or mutating a registry.
#[derive(Debug, Error)]
pub enum RevocationError {
    /// The backing file could not be read or written.
    #[error("registry I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not hold a JSON list of license ids.
    #[error("registry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous holder of the registry lock panicked.
    #[error("registry lock poisoned")]
    Poisoned,
}
