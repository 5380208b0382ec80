//! License issuance and verification for Tallarin.
//!
//! This crate handles:
//! - The license record and issuance requests
//! - Canonical encoding of a record into a frozen, signable token
//! - RSA PKCS#1 v1.5 / SHA-256 signatures over that token
//! - Verification combining revocation, signature, and expiry
//!
//! # License File Format
//!
//! A license file bundles the record, its encoded license
//! (`base64(client;registrant;logins;days;ext1,ext2)`), and a URL-safe
//! base64 signature over the encoded license. The encoded license is
//! computed once at issuance and never regenerated, because its
//! days-remaining field depends on the issuance time.
//!
//! Record fields outside the encoded license (the license id and the
//! exact expiry instant) are not covered by the signature.

mod canonical;
mod encoding;
mod error;
mod file;
mod issue;
mod keys;
mod record;
mod signing;
mod verifier;

pub use canonical::canonical_json;
pub use encoding::{
    DecodedLicense, EXTENSION_SEPARATOR, EncodedLicense, FIELD_SEPARATOR, days_remaining, encode,
};
pub use error::{LicenseError, LicenseResult};
pub use file::{LicenseEnvelope, LicenseFile, SignedPayload};
pub use issue::Issuer;
pub use keys::{DEFAULT_KEY_BITS, KeyPair, MIN_KEY_BITS, SigningKey, VerifyingKey};
pub use record::{DEFAULT_LOGIN_COUNT, DEFAULT_VALID_DAYS, IssueRequest, LicenseRecord};
pub use signing::{Signature, digest, sign, verify};
pub use verifier::{Verdict, Verifier};

pub use tallarin_types::LicenseId;
