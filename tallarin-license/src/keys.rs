//! RSA key material for signing and verifying licenses.
//!
//! Keys are loaded once and shared read-only (typically behind an `Arc`)
//! by every issuer and verifier in the process.
//!
//! Wire formats:
//! - private keys are written as PKCS#8 PEM; PKCS#1 PEM is also accepted
//! - public keys are exported as PKCS#1 PEM (`BEGIN RSA PUBLIC KEY`), which
//!   deployed clients expect; SPKI PEM is also accepted

use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::pkcs1v15;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{LicenseError, LicenseResult};

/// Modulus size used when none is configured.
pub const DEFAULT_KEY_BITS: usize = 4096;

/// Smallest modulus accepted for generated or loaded keys.
pub const MIN_KEY_BITS: usize = 2048;

/// RSA private key used to sign licenses (PKCS#1 v1.5, SHA-256).
#[derive(Clone)]
pub struct SigningKey(pkcs1v15::SigningKey<Sha256>);

/// RSA public key used to verify license signatures.
#[derive(Clone)]
pub struct VerifyingKey(pkcs1v15::VerifyingKey<Sha256>);

/// A matching signing and verifying key.
#[derive(Clone)]
pub struct KeyPair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl KeyPair {
    /// Generates a new key pair with a modulus of `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Key`] if `bits` is below [`MIN_KEY_BITS`] or
    /// generation fails.
    pub fn generate(bits: usize) -> LicenseResult<Self> {
        Ok(Self::from_signing_key(SigningKey::generate(bits)?))
    }

    /// Derives the pair from a private key.
    #[must_use]
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }
}

impl SigningKey {
    /// Generates a new private key with a modulus of `bits` bits.
    pub fn generate(bits: usize) -> LicenseResult<Self> {
        check_bits(bits)?;
        let key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| LicenseError::Key(format!("key generation failed: {e}")))?;
        Ok(Self::from_rsa(key))
    }

    /// Parses a PKCS#8 or PKCS#1 PEM private key.
    pub fn from_pem(pem: &str) -> LicenseResult<Self> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| LicenseError::Key(format!("invalid private key PEM: {e}")))?;
        check_bits(key.size() * 8)?;
        Ok(Self::from_rsa(key))
    }

    /// Exports the key as PKCS#8 PEM.
    pub fn to_pkcs8_pem(&self) -> LicenseResult<String> {
        let pem = self
            .rsa()
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| LicenseError::Key(format!("private key export failed: {e}")))?;
        Ok(pem.as_str().to_owned())
    }

    /// Returns the corresponding verifying key.
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::from_rsa(self.rsa().to_public_key())
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.rsa().size() * 8
    }

    pub(crate) fn inner(&self) -> &pkcs1v15::SigningKey<Sha256> {
        &self.0
    }

    fn from_rsa(key: RsaPrivateKey) -> Self {
        Self(pkcs1v15::SigningKey::new(key))
    }

    fn rsa(&self) -> &RsaPrivateKey {
        self.0.as_ref()
    }
}

impl VerifyingKey {
    /// Parses a PKCS#1 or SPKI PEM public key.
    pub fn from_pem(pem: &str) -> LicenseResult<Self> {
        let key = RsaPublicKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPublicKey::from_public_key_pem(pem))
            .map_err(|e| LicenseError::Key(format!("invalid public key PEM: {e}")))?;
        check_bits(key.size() * 8)?;
        Ok(Self::from_rsa(key))
    }

    /// Exports the key as PKCS#1 PEM.
    pub fn to_pkcs1_pem(&self) -> LicenseResult<String> {
        self.rsa()
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| LicenseError::Key(format!("public key export failed: {e}")))
    }

    /// Modulus size in bits.
    #[must_use]
    pub fn bits(&self) -> usize {
        self.rsa().size() * 8
    }

    pub(crate) fn inner(&self) -> &pkcs1v15::VerifyingKey<Sha256> {
        &self.0
    }

    fn from_rsa(key: RsaPublicKey) -> Self {
        Self(pkcs1v15::VerifyingKey::new(key))
    }

    fn rsa(&self) -> &RsaPublicKey {
        self.0.as_ref()
    }
}

impl PartialEq for VerifyingKey {
    fn eq(&self, other: &Self) -> bool {
        self.rsa() == other.rsa()
    }
}

impl Eq for VerifyingKey {}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("bits", &self.bits())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyingKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("signing_key", &self.signing_key)
            .field("verifying_key", &self.verifying_key)
            .finish()
    }
}

fn check_bits(bits: usize) -> LicenseResult<()> {
    if bits < MIN_KEY_BITS {
        return Err(LicenseError::Key(format!(
            "RSA modulus of {bits} bits is below the {MIN_KEY_BITS}-bit minimum"
        )));
    }
    Ok(())
}
