//! License identifiers.
//!
//! Identifiers are opaque strings. Freshly issued ids use the `LI` prefix
//! followed by the 32 uppercase hex digits of a random UUID v4, but any
//! non-empty, whitespace-free string is accepted so that ids issued by
//! older servers (`LI` + 8 hex digits) keep working.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Prefix carried by every generated license id.
pub const LICENSE_ID_PREFIX: &str = "LI";

/// Unique identifier of an issued license.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LicenseId(String);

impl LicenseId {
    /// Generates a fresh license id.
    #[must_use]
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("{LICENSE_ID_PREFIX}{hex}"))
    }

    /// Parses a license id from a string.
    pub fn parse(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::InvalidLicenseId("license id is empty".to_string()));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(Error::InvalidLicenseId(format!(
                "license id contains whitespace: {s:?}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this id has the shape produced by [`LicenseId::generate`].
    #[must_use]
    pub fn is_generated_format(&self) -> bool {
        self.0
            .strip_prefix(LICENSE_ID_PREFIX)
            .is_some_and(|hex| hex.len() == 32 && hex.chars().all(|c| matches!(c, '0'..='9' | 'A'..='F')))
    }
}

impl fmt::Display for LicenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LicenseId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LicenseId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)?;
        Ok(Self(value))
    }
}

impl From<LicenseId> for String {
    fn from(id: LicenseId) -> Self {
        id.0
    }
}

impl AsRef<str> for LicenseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
