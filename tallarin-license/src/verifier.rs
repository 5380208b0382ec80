//! License verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. structure (`Malformed`)
//! 2. revocation (`Revoked`), before any cryptography
//! 3. signature over the stored payload (`SignatureInvalid`)
//! 4. expiry (`Expired`)
//!
//! License files are untrusted input. Every problem with the file itself
//! becomes a [`Verdict`]; the only error a verifier returns is a failure of
//! the revocation registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tallarin_revocation::RevocationRegistry;
use tracing::debug;

use crate::error::{LicenseError, LicenseResult};
use crate::file::{LicenseEnvelope, LicenseFile};
use crate::keys::VerifyingKey;
use crate::signing::{Signature, verify};

/// Outcome of verifying a license file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    Valid,
    Expired,
    Revoked,
    SignatureInvalid,
    Malformed,
}

impl Verdict {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "License is valid",
            Self::Expired => "License has expired",
            Self::Revoked => "License has been revoked",
            Self::SignatureInvalid => "Invalid license signature",
            Self::Malformed => "Invalid license file structure",
        }
    }

    /// Stable machine-readable name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::SignatureInvalid => "signatureInvalid",
            Self::Malformed => "malformed",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verifies license files against a public key and a revocation registry.
#[derive(Debug, Clone)]
pub struct Verifier {
    verifying_key: Arc<VerifyingKey>,
    registry: Arc<dyn RevocationRegistry>,
}

impl Verifier {
    #[must_use]
    pub fn new(verifying_key: Arc<VerifyingKey>, registry: Arc<dyn RevocationRegistry>) -> Self {
        Self {
            verifying_key,
            registry,
        }
    }

    /// Verifies an issued license file.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried.
    pub fn verify(&self, file: &LicenseFile) -> LicenseResult<Verdict> {
        self.verify_at(file, Utc::now())
    }

    /// Verifies an issued license file against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried.
    pub fn verify_at(&self, file: &LicenseFile, now: DateTime<Utc>) -> LicenseResult<Verdict> {
        self.verify_envelope_at(&LicenseEnvelope::from(file), now)
    }

    /// Verifies license file JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried. Unreadable input yields [`Verdict::Malformed`].
    pub fn verify_json(&self, text: &str) -> LicenseResult<Verdict> {
        self.verify_json_at(text, Utc::now())
    }

    /// Verifies license file JSON text against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried. Unreadable input yields [`Verdict::Malformed`].
    pub fn verify_json_at(&self, text: &str, now: DateTime<Utc>) -> LicenseResult<Verdict> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.verify_value_at(&value, now),
            Err(e) => {
                debug!(error = %e, "license file is not JSON");
                Ok(Verdict::Malformed)
            }
        }
    }

    /// Verifies an already parsed license file.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried. Unreadable input yields [`Verdict::Malformed`].
    pub fn verify_value(&self, value: &Value) -> LicenseResult<Verdict> {
        self.verify_value_at(value, Utc::now())
    }

    /// Verifies an already parsed license file against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried. Unreadable input yields [`Verdict::Malformed`].
    pub fn verify_value_at(&self, value: &Value, now: DateTime<Utc>) -> LicenseResult<Verdict> {
        match LicenseEnvelope::from_value(value) {
            Ok(envelope) => self.verify_envelope_at(&envelope, now),
            Err(e) => {
                debug!(error = %e, "rejected license file");
                Ok(Verdict::Malformed)
            }
        }
    }

    /// Runs the revocation, signature, and expiry checks.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Registry`] only if the revocation registry
    /// cannot be queried.
    pub fn verify_envelope_at(
        &self,
        envelope: &LicenseEnvelope,
        now: DateTime<Utc>,
    ) -> LicenseResult<Verdict> {
        let record = &envelope.record;

        let verdict = if self
            .registry
            .contains(&record.license_id)
            .map_err(LicenseError::Registry)?
        {
            Verdict::Revoked
        } else if !self.signature_matches(envelope) {
            Verdict::SignatureInvalid
        } else if record.valid_until < now {
            Verdict::Expired
        } else {
            Verdict::Valid
        };

        debug!(
            license_id = %record.license_id,
            legacy = envelope.payload.is_legacy(),
            %verdict,
            "verified license"
        );
        Ok(verdict)
    }

    fn signature_matches(&self, envelope: &LicenseEnvelope) -> bool {
        Signature::from_base64url(&envelope.signature)
            .and_then(|sig| verify(envelope.payload.message(), &sig, &self.verifying_key))
            .is_ok()
    }
}
