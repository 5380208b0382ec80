//! License records and issuance requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tallarin_types::LicenseId;

use crate::encoding::{EXTENSION_SEPARATOR, FIELD_SEPARATOR};
use crate::error::{LicenseError, LicenseResult};

/// Login quota used when a request does not specify one.
pub const DEFAULT_LOGIN_COUNT: u64 = 100;

/// Validity used when a request does not specify one.
pub const DEFAULT_VALID_DAYS: u32 = 365;

/// The attributes of an issued license.
///
/// Field order matches the JSON layout written by earlier issuers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    /// Assigned once at issuance.
    pub license_id: LicenseId,
    /// Licensed installation.
    pub client_id: String,
    /// Feature flags. Order is part of the signed encoding.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Usage quota, enforced by the licensed application.
    #[serde(rename = "loginCount")]
    pub login_count_limit: u64,
    /// Registrant name.
    pub registered_for: String,
    /// Expiry instant, serialized as Unix seconds.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub valid_until: DateTime<Utc>,
}

/// A request to issue a new license.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub registered_for: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_days: Option<u32>,
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl IssueRequest {
    /// Creates a request with default quota, validity, and no extensions.
    #[must_use]
    pub fn new(client_id: impl Into<String>, registered_for: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            registered_for: registered_for.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_login_count(mut self, login_count: u64) -> Self {
        self.login_count = Some(login_count);
        self
    }

    #[must_use]
    pub fn with_valid_days(mut self, valid_days: u32) -> Self {
        self.valid_days = Some(valid_days);
        self
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Login quota after applying the default.
    #[must_use]
    pub fn effective_login_count(&self) -> u64 {
        self.login_count.unwrap_or(DEFAULT_LOGIN_COUNT)
    }

    /// Validity in days after applying the default.
    #[must_use]
    pub fn effective_valid_days(&self) -> u32 {
        self.valid_days.unwrap_or(DEFAULT_VALID_DAYS)
    }

    /// Checks the request before anything is signed.
    ///
    /// The encoded license does not escape its separators, so `;` and `,`
    /// are refused in every field that ends up in the encoding.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::MissingField`] for an empty client id or
    /// registrant and [`LicenseError::InvalidField`] for anything else.
    pub fn validate(&self) -> LicenseResult<()> {
        if self.client_id.is_empty() {
            return Err(LicenseError::MissingField("clientId"));
        }
        if self.registered_for.is_empty() {
            return Err(LicenseError::MissingField("registeredFor"));
        }
        check_separators("clientId", &self.client_id)?;
        check_separators("registeredFor", &self.registered_for)?;

        if self.effective_login_count() == 0 {
            return Err(LicenseError::InvalidField {
                field: "loginCount",
                reason: "must be positive".to_string(),
            });
        }
        if self.effective_valid_days() == 0 {
            return Err(LicenseError::InvalidField {
                field: "validDays",
                reason: "must be positive".to_string(),
            });
        }

        for ext in &self.extensions {
            if ext.is_empty() {
                return Err(LicenseError::InvalidField {
                    field: "extensions",
                    reason: "extension names must not be empty".to_string(),
                });
            }
            check_separators("extensions", ext)?;
        }
        Ok(())
    }
}

fn check_separators(field: &'static str, value: &str) -> LicenseResult<()> {
    if value.contains([FIELD_SEPARATOR, EXTENSION_SEPARATOR]) {
        return Err(LicenseError::InvalidField {
            field,
            reason: format!("must not contain '{FIELD_SEPARATOR}' or '{EXTENSION_SEPARATOR}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let req = IssueRequest::new("C1", "Acme");
        assert_eq!(req.effective_login_count(), 100);
        assert_eq!(req.effective_valid_days(), 365);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_client_id() {
        let err = IssueRequest::new("", "Acme").validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: clientId");
    }

    #[test]
    fn missing_registrant() {
        let err = IssueRequest::new("C1", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: registeredFor");
    }

    #[test]
    fn separators_rejected() {
        assert!(IssueRequest::new("C;1", "Acme").validate().is_err());
        assert!(IssueRequest::new("C1", "Acme, Inc").validate().is_err());
        let req = IssueRequest::new("C1", "Acme").with_extensions(["a,b"]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn zero_quota_and_validity_rejected() {
        assert!(IssueRequest::new("C1", "Acme").with_login_count(0).validate().is_err());
        assert!(IssueRequest::new("C1", "Acme").with_valid_days(0).validate().is_err());
    }

    #[test]
    fn request_json_uses_camel_case() {
        let req: IssueRequest = serde_json::from_str(
            r#"{"clientId":"C1","registeredFor":"Acme","loginCount":50,"validDays":30,"extensions":["premium"]}"#,
        )
        .unwrap();
        assert_eq!(
            req,
            IssueRequest::new("C1", "Acme")
                .with_login_count(50)
                .with_valid_days(30)
                .with_extensions(["premium"])
        );
    }
}
