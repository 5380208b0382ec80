//! Revocation registry for Tallarin licenses.
//!
//! A registry is an append-only set of revoked [`LicenseId`]s. The license
//! verifier only ever asks whether an id is present; the administrative
//! revoke operation is the only writer. There is no un-revoke.
//!
//! # Adapters
//!
//! - [`MemoryRegistry`]: in-process set, optionally seeded from a list
//! - [`JsonFileRegistry`]: flat JSON array rewritten wholesale on each add
//!
//! Implementations must serialize concurrent [`RevocationRegistry::add`]
//! calls so that two racing revokes cannot lose an update.

mod error;
mod file;
mod memory;

pub use error::{RevocationError, RevocationResult};
pub use file::JsonFileRegistry;
pub use memory::MemoryRegistry;

use std::fmt::Debug;
use std::sync::Arc;
use tallarin_types::LicenseId;

/// Outcome of adding an id to a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was not revoked before and now is.
    Added,
    /// The id was already revoked; nothing changed.
    AlreadyPresent,
}

impl AddOutcome {
    /// Returns true if the registry changed.
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added)
    }
}

/// Storage interface for revoked license ids.
pub trait RevocationRegistry: Send + Sync + Debug {
    /// Returns true if the id has been revoked.
    fn contains(&self, id: &LicenseId) -> RevocationResult<bool>;

    /// Revokes an id. Re-revoking is a no-op reported as
    /// [`AddOutcome::AlreadyPresent`].
    fn add(&self, id: LicenseId) -> RevocationResult<AddOutcome>;

    /// Returns every revoked id in insertion order.
    fn list(&self) -> RevocationResult<Vec<LicenseId>>;
}

impl<R: RevocationRegistry + ?Sized> RevocationRegistry for Arc<R> {
    fn contains(&self, id: &LicenseId) -> RevocationResult<bool> {
        (**self).contains(id)
    }

    fn add(&self, id: LicenseId) -> RevocationResult<AddOutcome> {
        (**self).add(id)
    }

    fn list(&self) -> RevocationResult<Vec<LicenseId>> {
        (**self).list()
    }
}
