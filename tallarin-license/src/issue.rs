//! License issuance.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use std::sync::Arc;
use tallarin_types::LicenseId;
use tracing::info;

use crate::encoding::encode;
use crate::error::{LicenseError, LicenseResult};
use crate::file::LicenseFile;
use crate::keys::SigningKey;
use crate::record::{IssueRequest, LicenseRecord};
use crate::signing::sign;

/// Builds, encodes, and signs new licenses.
#[derive(Debug, Clone)]
pub struct Issuer {
    signing_key: Arc<SigningKey>,
}

impl Issuer {
    #[must_use]
    pub fn new(signing_key: Arc<SigningKey>) -> Self {
        Self { signing_key }
    }

    /// Issues a license valid from now.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad request (nothing is signed), or
    /// [`LicenseError::Signing`] if the key operation fails.
    pub fn issue(&self, request: &IssueRequest) -> LicenseResult<LicenseFile> {
        self.issue_at(request, Utc::now())
    }

    /// Issues a license as if the current time were `now`.
    ///
    /// `now` is truncated to whole seconds so the expiry instant and the
    /// encoded days remaining agree exactly.
    pub fn issue_at(&self, request: &IssueRequest, now: DateTime<Utc>) -> LicenseResult<LicenseFile> {
        request.validate()?;

        let issued_at = now.trunc_subsecs(0);
        let valid_days = request.effective_valid_days();
        let valid_until = TimeDelta::try_days(i64::from(valid_days))
            .and_then(|validity| issued_at.checked_add_signed(validity))
            .ok_or_else(|| LicenseError::InvalidField {
                field: "validDays",
                reason: format!("{valid_days} days is out of range"),
            })?;

        let record = LicenseRecord {
            license_id: LicenseId::generate(),
            client_id: request.client_id.clone(),
            extensions: request.extensions.clone(),
            login_count_limit: request.effective_login_count(),
            registered_for: request.registered_for.clone(),
            valid_until,
        };

        let license_key = encode(&record, issued_at);
        let signature = sign(license_key.as_bytes(), &self.signing_key)?;

        info!(
            license_id = %record.license_id,
            client_id = %record.client_id,
            valid_until = %record.valid_until,
            "issued license"
        );
        Ok(LicenseFile::new(record, license_key, signature))
    }
}
