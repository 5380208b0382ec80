//! Core type definitions for Tallarin licensing.
//!
//! This crate holds the identifiers shared by the license protocol, the
//! revocation registry, and the activation server. It has no knowledge of
//! signing or storage.

mod ids;

pub use ids::{LICENSE_ID_PREFIX, LicenseId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid license id: {0}")]
    InvalidLicenseId(String),
}
