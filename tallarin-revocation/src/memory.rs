//! In-memory registry.
//!
//! Suitable for tests, single-process deployments, and client-side
//! verification against a revocation list fetched from the server.
//! Contents are lost on restart.

use std::collections::HashSet;
use std::sync::RwLock;
use tallarin_types::LicenseId;
use tracing::info;

use crate::{AddOutcome, RevocationError, RevocationRegistry, RevocationResult};

/// Ordered set of revoked ids. Shared by the in-memory and file adapters.
#[derive(Debug, Default, Clone)]
pub(crate) struct RevokedSet {
    order: Vec<LicenseId>,
    index: HashSet<LicenseId>,
}

impl RevokedSet {
    pub(crate) fn from_ids(ids: impl IntoIterator<Item = LicenseId>) -> Self {
        let mut set = Self::default();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub(crate) fn contains(&self, id: &LicenseId) -> bool {
        self.index.contains(id)
    }

    /// Returns false if the id was already present.
    pub(crate) fn insert(&mut self, id: LicenseId) -> bool {
        if !self.index.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub(crate) fn ids(&self) -> &[LicenseId] {
        &self.order
    }
}

/// Registry held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    revoked: RwLock<RevokedSet>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the given ids. Duplicates are dropped.
    #[must_use]
    pub fn from_ids(ids: impl IntoIterator<Item = LicenseId>) -> Self {
        Self {
            revoked: RwLock::new(RevokedSet::from_ids(ids)),
        }
    }
}

impl RevocationRegistry for MemoryRegistry {
    fn contains(&self, id: &LicenseId) -> RevocationResult<bool> {
        let revoked = self.revoked.read().map_err(|_| RevocationError::Poisoned)?;
        Ok(revoked.contains(id))
    }

    fn add(&self, id: LicenseId) -> RevocationResult<AddOutcome> {
        let mut revoked = self.revoked.write().map_err(|_| RevocationError::Poisoned)?;
        if revoked.insert(id.clone()) {
            info!(license_id = %id, "revoked license");
            Ok(AddOutcome::Added)
        } else {
            Ok(AddOutcome::AlreadyPresent)
        }
    }

    fn list(&self) -> RevocationResult<Vec<LicenseId>> {
        let revoked = self.revoked.read().map_err(|_| RevocationError::Poisoned)?;
        Ok(revoked.ids().to_vec())
    }
}
