//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tallarin_license::{
    IssueRequest, Issuer, KeyPair, LicenseFile, LicenseRecord, MIN_KEY_BITS, canonical_json, sign,
};
use tallarin_revocation::{MemoryRegistry, RevocationRegistry};
use tallarin_license::Verifier;

/// One key pair per test binary; RSA generation is slow.
pub fn test_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| KeyPair::generate(MIN_KEY_BITS).unwrap())
}

/// A second, unrelated key pair.
pub fn other_keypair() -> &'static KeyPair {
    static KEYS: OnceLock<KeyPair> = OnceLock::new();
    KEYS.get_or_init(|| KeyPair::generate(MIN_KEY_BITS).unwrap())
}

/// Fixed issuance instant used across tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn issuer() -> Issuer {
    Issuer::new(Arc::new(test_keypair().signing_key.clone()))
}

pub fn verifier(registry: Arc<dyn RevocationRegistry>) -> Verifier {
    Verifier::new(Arc::new(test_keypair().verifying_key.clone()), registry)
}

pub fn verifier_with_empty_registry() -> (Verifier, Arc<MemoryRegistry>) {
    let registry = Arc::new(MemoryRegistry::new());
    (verifier(registry.clone()), registry)
}

pub fn acme_request() -> IssueRequest {
    IssueRequest::new("C1", "Acme")
        .with_login_count(100)
        .with_valid_days(365)
}

/// Issues the standard Acme license at [`t0`].
pub fn issue_acme() -> LicenseFile {
    issuer().issue_at(&acme_request(), t0()).unwrap()
}

/// Serializes a license file into untrusted JSON form.
pub fn to_value(file: &LicenseFile) -> Value {
    serde_json::to_value(file).unwrap()
}

/// Builds a legacy license file (no `licenseKey`) signed over the canonical
/// JSON of the record.
pub fn legacy_file(record: &LicenseRecord) -> Value {
    let license = serde_json::to_value(record).unwrap();
    let signature = sign(canonical_json(&license).as_bytes(), &test_keypair().signing_key).unwrap();
    serde_json::json!({
        "license": license,
        "signature": signature.to_base64url(),
    })
}
