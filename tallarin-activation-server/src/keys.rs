//! Signing key files on disk.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tallarin_license::{KeyPair, SigningKey, VerifyingKey};
use tracing::{info, warn};

/// Loads the signing key pair, generating and saving one if the private key
/// is missing.
///
/// The private key is written as PKCS#8 PEM and the public key as PKCS#1
/// PEM. When loading, the public key must belong to the private key. A
/// missing public key is derived from the private key and rewritten; the
/// private key file is left untouched.
pub fn load_or_generate(private_path: &Path, public_path: &Path, bits: usize) -> Result<KeyPair> {
    if private_path.exists() {
        info!("Loading signing keys from {:?}", private_path);
        let private_pem = fs::read_to_string(private_path)
            .with_context(|| format!("Failed to read private key {}", private_path.display()))?;
        let signing_key = SigningKey::from_pem(&private_pem).context("Failed to decode private key")?;
        let keys = KeyPair::from_signing_key(signing_key);

        if !public_path.exists() {
            warn!("Public key {:?} missing, deriving it from the private key", public_path);
            write_public(public_path, &keys.verifying_key)?;
            return Ok(keys);
        }

        let public_pem = fs::read_to_string(public_path)
            .with_context(|| format!("Failed to read public key {}", public_path.display()))?;
        let verifying_key = VerifyingKey::from_pem(&public_pem).context("Failed to decode public key")?;
        if keys.verifying_key != verifying_key {
            bail!(
                "public key {} does not match private key {}",
                public_path.display(),
                private_path.display()
            );
        }
        return Ok(keys);
    }

    if public_path.exists() {
        warn!("Private key {:?} missing, replacing public key {:?}", private_path, public_path);
    }
    info!(bits, "Generating new signing keys at {:?}", private_path);
    let keys = KeyPair::generate(bits).context("Failed to generate signing keys")?;
    write_private(private_path, &keys.signing_key.to_pkcs8_pem()?)
        .with_context(|| format!("Failed to write private key {}", private_path.display()))?;
    write_public(public_path, &keys.verifying_key)?;
    Ok(keys)
}

fn write_public(path: &Path, key: &VerifyingKey) -> Result<()> {
    fs::write(path, key.to_pkcs1_pem()?)
        .with_context(|| format!("Failed to write public key {}", path.display()))
}

#[cfg(unix)]
fn write_private(path: &Path, pem: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(pem.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, pem: &str) -> std::io::Result<()> {
    fs::write(path, pem)
}
