//! Error types for the licensing module.
//!
//! Verification outcomes are not errors; see [`crate::Verdict`]. These
//! variants cover rejected issuance requests, bad key material, and
//! infrastructure failures.

use tallarin_revocation::RevocationError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// A required issuance field is absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// An issuance field is present but unusable.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// Invalid encoded license token.
    #[error("invalid license key format: {0}")]
    InvalidKeyFormat(String),

    /// License file does not have the expected structure.
    #[error("malformed license file: {0}")]
    Malformed(String),

    /// RSA signature verification failed.
    #[error("license signature invalid")]
    InvalidSignature,

    /// Key material could not be generated, parsed, or exported.
    #[error("key error: {0}")]
    Key(String),

    /// The private key operation failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The revocation registry could not be queried or updated.
    #[error("revocation registry error: {0}")]
    Registry(#[from] RevocationError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
