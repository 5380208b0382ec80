//! License signatures.
//!
//! The signed message is the SHA-256 digest of the payload bytes, signed
//! with RSA PKCS#1 v1.5 over SHA-256. Deployed verifiers hash the payload
//! themselves and hand the digest to the RSA primitive, so the digest (not
//! the payload) is what goes through the signature hash.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use rsa::pkcs1v15;
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{LicenseError, LicenseResult};
use crate::keys::{SigningKey, VerifyingKey};

/// URL-safe base64 that writes padding and accepts it either way.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Raw signature bytes. Serialized as URL-safe base64.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wraps raw signature bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encodes the signature as padded URL-safe base64.
    #[must_use]
    pub fn to_base64url(&self) -> String {
        URL_SAFE_LENIENT.encode(&self.0)
    }

    /// Decodes URL-safe base64, with or without padding.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidKeyFormat`] if `s` is not URL-safe
    /// base64.
    pub fn from_base64url(s: &str) -> LicenseResult<Self> {
        URL_SAFE_LENIENT
            .decode(s.trim())
            .map(Self)
            .map_err(|e| LicenseError::InvalidKeyFormat(format!("invalid signature base64: {e}")))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({})", self.to_base64url())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64url(&s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 of the payload bytes.
#[must_use]
pub fn digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// Signs a payload.
///
/// # Errors
///
/// Returns [`LicenseError::Signing`] if the RSA operation fails.
pub fn sign(message: &[u8], key: &SigningKey) -> LicenseResult<Signature> {
    let sig = key
        .inner()
        .try_sign(&digest(message))
        .map_err(|e| LicenseError::Signing(e.to_string()))?;
    Ok(Signature(sig.to_vec()))
}

/// Checks a signature over a payload.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidSignature`] for any mismatch, including
/// signatures of the wrong length.
pub fn verify(message: &[u8], signature: &Signature, key: &VerifyingKey) -> LicenseResult<()> {
    let sig = pkcs1v15::Signature::try_from(signature.as_bytes())
        .map_err(|_| LicenseError::InvalidSignature)?;
    key.inner()
        .verify(&digest(message), &sig)
        .map_err(|_| LicenseError::InvalidSignature)
}
