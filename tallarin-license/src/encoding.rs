//! Canonical license encoding.
//!
//! A license is encoded as
//!
//! ```text
//! base64(client_id;registered_for;login_count;days_remaining;ext1,ext2,...)
//! ```
//!
//! using the standard padded base64 alphabet. `days_remaining` depends on
//! the reference time, so the token is only meaningful as a snapshot: it is
//! produced once at issuance, stored verbatim in the license file, and
//! never recomputed. Signatures cover the token's UTF-8 bytes.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;

/// Separates the five top-level fields.
pub const FIELD_SEPARATOR: char = ';';

/// Separates extension names within the last field.
pub const EXTENSION_SEPARATOR: char = ',';

const FIELD_COUNT: usize = 5;

/// A frozen, base64-encoded license token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedLicense(String);

impl EncodedLicense {
    /// Wraps a token exactly as received. No validation is done; the token
    /// is what the signature covers.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the bytes covered by the signature.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Decodes the token back into its fields.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidKeyFormat`] if the token is not
    /// base64, not UTF-8, or does not have five fields.
    pub fn decode(&self) -> LicenseResult<DecodedLicense> {
        let bytes = BASE64
            .decode(self.0.as_bytes())
            .map_err(|e| LicenseError::InvalidKeyFormat(format!("invalid base64: {e}")))?;
        let plain = String::from_utf8(bytes)
            .map_err(|_| LicenseError::InvalidKeyFormat("license key is not UTF-8".to_string()))?;

        let fields: Vec<&str> = plain.split(FIELD_SEPARATOR).collect();
        if fields.len() != FIELD_COUNT {
            return Err(LicenseError::InvalidKeyFormat(format!(
                "expected {FIELD_COUNT} fields, found {}",
                fields.len()
            )));
        }

        let login_count_limit = fields[2].parse().map_err(|_| {
            LicenseError::InvalidKeyFormat(format!("invalid login count: {:?}", fields[2]))
        })?;
        let days_remaining = fields[3].parse().map_err(|_| {
            LicenseError::InvalidKeyFormat(format!("invalid days remaining: {:?}", fields[3]))
        })?;
        let extensions = if fields[4].is_empty() {
            Vec::new()
        } else {
            fields[4].split(EXTENSION_SEPARATOR).map(str::to_string).collect()
        };

        Ok(DecodedLicense {
            client_id: fields[0].to_string(),
            registered_for: fields[1].to_string(),
            login_count_limit,
            days_remaining,
            extensions,
        })
    }
}

impl std::fmt::Display for EncodedLicense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fields carried inside an encoded license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLicense {
    pub client_id: String,
    pub registered_for: String,
    pub login_count_limit: u64,
    /// Whole days of validity left when the license was issued.
    pub days_remaining: u64,
    pub extensions: Vec<String>,
}

/// Whole days from `reference` until `valid_until`, never negative.
#[must_use]
pub fn days_remaining(valid_until: DateTime<Utc>, reference: DateTime<Utc>) -> u64 {
    u64::try_from((valid_until - reference).num_days()).unwrap_or(0)
}

/// Encodes a record as seen at `reference`.
#[must_use]
pub fn encode(record: &LicenseRecord, reference: DateTime<Utc>) -> EncodedLicense {
    let ext_sep = EXTENSION_SEPARATOR.to_string();
    let plain = format!(
        "{client}{sep}{registrant}{sep}{logins}{sep}{days}{sep}{extensions}",
        client = record.client_id,
        registrant = record.registered_for,
        logins = record.login_count_limit,
        days = days_remaining(record.valid_until, reference),
        extensions = record.extensions.join(ext_sep.as_str()),
        sep = FIELD_SEPARATOR,
    );
    EncodedLicense(BASE64.encode(plain.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tallarin_types::LicenseId;

    fn record(extensions: &[&str], valid_until: DateTime<Utc>) -> LicenseRecord {
        LicenseRecord {
            license_id: LicenseId::parse("LI00000001").unwrap(),
            client_id: "C1".to_string(),
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            login_count_limit: 100,
            registered_for: "Acme".to_string(),
            valid_until,
        }
    }

    fn plain(encoded: &EncodedLicense) -> String {
        String::from_utf8(BASE64.decode(encoded.as_str()).unwrap()).unwrap()
    }

    #[test]
    fn field_order_and_separators() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let encoded = encode(&record(&["premium", "api_access"], t + Duration::days(365)), t);
        assert_eq!(plain(&encoded), "C1;Acme;100;365;premium,api_access");
    }

    #[test]
    fn empty_extensions_keep_trailing_separator() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let encoded = encode(&record(&[], t + Duration::days(30)), t);
        assert_eq!(plain(&encoded), "C1;Acme;100;30;");
    }

    #[test]
    fn partial_days_truncate() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let valid_until = t + Duration::days(10) - Duration::seconds(1);
        assert_eq!(days_remaining(valid_until, t), 9);
    }

    #[test]
    fn past_expiry_floors_at_zero() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(days_remaining(t - Duration::days(3), t), 0);
        assert_eq!(days_remaining(t - Duration::seconds(1), t), 0);
    }

    #[test]
    fn extension_order_changes_bytes() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let a = encode(&record(&["x", "y"], t + Duration::days(1)), t);
        let b = encode(&record(&["y", "x"], t + Duration::days(1)), t);
        assert_ne!(a, b);
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        let token = EncodedLicense::from_token(BASE64.encode("C1;Acme;100;365"));
        assert!(token.decode().is_err());
    }

    #[test]
    fn decode_rejects_non_base64() {
        assert!(EncodedLicense::from_token("***").decode().is_err());
    }
}
