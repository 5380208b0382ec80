//! Flat-file registry.
//!
//! The file holds a pretty-printed JSON array of license ids. It is read
//! once when the registry is opened and rewritten wholesale on every
//! successful add, via a sibling temporary file and an atomic rename. This
//! is only reasonable while the revoked set stays small.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tallarin_types::LicenseId;
use tracing::{debug, info, warn};

use crate::memory::RevokedSet;
use crate::{AddOutcome, RevocationError, RevocationRegistry, RevocationResult};

/// Registry persisted to a JSON file.
#[derive(Debug)]
pub struct JsonFileRegistry {
    path: PathBuf,
    revoked: Mutex<RevokedSet>,
}

impl JsonFileRegistry {
    /// Opens the registry at `path`. A missing file is an empty registry;
    /// it is created on the first add.
    pub fn open(path: impl Into<PathBuf>) -> RevocationResult<Self> {
        let path = path.into();
        let ids = load_ids(&path)?;
        debug!(path = %path.display(), count = ids.len(), "opened revocation registry");
        Ok(Self {
            path,
            revoked: Mutex::new(RevokedSet::from_ids(ids)),
        })
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RevocationRegistry for JsonFileRegistry {
    fn contains(&self, id: &LicenseId) -> RevocationResult<bool> {
        let revoked = self.revoked.lock().map_err(|_| RevocationError::Poisoned)?;
        Ok(revoked.contains(id))
    }

    fn add(&self, id: LicenseId) -> RevocationResult<AddOutcome> {
        // Held across the write so concurrent adds cannot interleave.
        let mut revoked = self.revoked.lock().map_err(|_| RevocationError::Poisoned)?;
        if revoked.contains(&id) {
            return Ok(AddOutcome::AlreadyPresent);
        }

        let mut next = revoked.clone();
        next.insert(id.clone());
        if let Err(e) = store_ids(&self.path, next.ids()) {
            warn!(license_id = %id, path = %self.path.display(), error = %e, "failed to persist revocation");
            return Err(e);
        }
        *revoked = next;

        info!(license_id = %id, "revoked license");
        Ok(AddOutcome::Added)
    }

    fn list(&self) -> RevocationResult<Vec<LicenseId>> {
        let revoked = self.revoked.lock().map_err(|_| RevocationError::Poisoned)?;
        Ok(revoked.ids().to_vec())
    }
}

/// Reads the id list. Entries that are not valid license ids are skipped
/// with a warning and dropped on the next rewrite.
fn load_ids(path: &Path) -> RevocationResult<Vec<LicenseId>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RevocationError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let entries: Vec<serde_json::Value> = serde_json::from_slice(&bytes)?;
    let mut ids = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match entry.as_str().map(LicenseId::parse) {
            Some(Ok(id)) => ids.push(id),
            Some(Err(e)) => warn!(?path, index, error = %e, "skipping invalid revoked license id"),
            None => warn!(?path, index, %entry, "skipping non-string revoked license entry"),
        }
    }
    Ok(ids)
}

fn store_ids(path: &Path, ids: &[LicenseId]) -> RevocationResult<()> {
    let json = serde_json::to_vec_pretty(ids)?;
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| RevocationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(&tmp).map_err(io_err)?;
    file.write_all(&json).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);
    fs::rename(&tmp, path).map_err(io_err)
}
