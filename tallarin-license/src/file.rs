//! License files: the unit of distribution.
//!
//! ```json
//! {
//!   "license": { "licenseId": "...", "clientId": "...", "extensions": [],
//!                "loginCount": 100, "registeredFor": "...", "validUntil": 1767225600 },
//!   "licenseKey": "<base64 encoded license>",
//!   "signature": "<base64url signature>"
//! }
//! ```
//!
//! Files without `licenseKey` predate the encoded license; their signature
//! covers the canonical JSON of the `license` object instead. A
//! `licenseKey` that is present but not a string (including `null`) is not
//! a structural error: the file goes through revocation and then fails the
//! signature check.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::canonical_json;
use crate::encoding::EncodedLicense;
use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;
use crate::signing::Signature;

/// A license file as produced by the issuer. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFile {
    license: LicenseRecord,
    #[serde(rename = "licenseKey")]
    license_key: EncodedLicense,
    signature: Signature,
}

impl LicenseFile {
    pub(crate) fn new(license: LicenseRecord, license_key: EncodedLicense, signature: Signature) -> Self {
        Self {
            license,
            license_key,
            signature,
        }
    }

    /// The license record.
    #[must_use]
    pub fn license(&self) -> &LicenseRecord {
        &self.license
    }

    /// The frozen encoded license the signature covers.
    #[must_use]
    pub fn license_key(&self) -> &EncodedLicense {
        &self.license_key
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Serializes the file as indented JSON for saving to disk.
    pub fn to_json_pretty(&self) -> LicenseResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The bytes a license signature covers, chosen by which fields a file
/// carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignedPayload {
    /// Current format: the stored `licenseKey` token.
    Encoded(EncodedLicense),
    /// Legacy format: canonical JSON of the `license` object as received.
    Legacy(String),
}

impl SignedPayload {
    /// Returns the exact bytes that were signed.
    #[must_use]
    pub fn message(&self) -> &[u8] {
        match self {
            Self::Encoded(key) => key.as_bytes(),
            Self::Legacy(json) => json.as_bytes(),
        }
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

/// A structurally complete, not yet verified license file.
///
/// The signature is kept as received; decoding it is part of signature
/// verification, not of structural parsing.
#[derive(Debug, Clone)]
pub struct LicenseEnvelope {
    pub record: LicenseRecord,
    pub payload: SignedPayload,
    pub signature: String,
}

impl LicenseEnvelope {
    /// Parses untrusted JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Malformed`] if `license` or `signature` is
    /// missing or has the wrong type, or the record cannot be read.
    pub fn from_value(value: &Value) -> LicenseResult<Self> {
        let file = value
            .as_object()
            .ok_or_else(|| malformed("license file is not a JSON object"))?;

        let license = match file.get("license") {
            Some(Value::Object(license)) => license,
            Some(_) => return Err(malformed("`license` is not an object")),
            None => return Err(malformed("missing `license`")),
        };
        let signature = match file.get("signature") {
            Some(Value::String(signature)) => signature.clone(),
            Some(_) => return Err(malformed("`signature` is not a string")),
            None => return Err(malformed("missing `signature`")),
        };
        let payload = match file.get("licenseKey") {
            Some(Value::String(key)) => SignedPayload::Encoded(EncodedLicense::from_token(key.clone())),
            // Present but unusable: current format with an empty token, which
            // the issuer never signs.
            Some(_) => SignedPayload::Encoded(EncodedLicense::from_token(String::new())),
            None => SignedPayload::Legacy(legacy_message(license)),
        };

        let record: LicenseRecord = serde_json::from_value(Value::Object(license.clone()))
            .map_err(|e| malformed(&format!("invalid `license` record: {e}")))?;

        Ok(Self {
            record,
            payload,
            signature,
        })
    }

    /// Parses untrusted JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Malformed`] if the text is not JSON or fails
    /// [`LicenseEnvelope::from_value`].
    pub fn from_json(text: &str) -> LicenseResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| malformed(&format!("invalid JSON: {e}")))?;
        Self::from_value(&value)
    }
}

impl From<&LicenseFile> for LicenseEnvelope {
    fn from(file: &LicenseFile) -> Self {
        Self {
            record: file.license.clone(),
            payload: SignedPayload::Encoded(file.license_key.clone()),
            signature: file.signature.to_base64url(),
        }
    }
}

fn legacy_message(license: &Map<String, Value>) -> String {
    canonical_json(&Value::Object(license.clone()))
}

fn malformed(reason: &str) -> LicenseError {
    LicenseError::Malformed(reason.to_string())
}
