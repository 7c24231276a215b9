//! User-namespace identity mapping tables.
//!
//! A container running in a user namespace sees its own UID/GID space; the
//! kernel maps that space onto host IDs through ordered
//! `(container, host, size)` ranges. This crate models those tables and the
//! container-to-host lookups the runtime needs whenever it creates files on a
//! container's behalf.
//!
//! An empty table is the identity mapping: with no user namespace configured,
//! container IDs and host IDs coincide.

mod error;

pub use error::{IdMapError, Result};

use serde::{Deserialize, Serialize};

/// One contiguous mapping range from container ID space into host ID space.
///
/// Covers the container IDs `[container_id, container_id + size)`, mapped
/// one-to-one onto the host IDs starting at `host_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMap {
    /// First container-side ID of the range.
    pub container_id: u32,
    /// First host-side ID of the range.
    pub host_id: u32,
    /// Number of IDs in the range.
    pub size: u32,
}

impl IdMap {
    /// Create a single mapping range.
    pub fn new(container_id: u32, host_id: u32, size: u32) -> Self {
        Self {
            container_id,
            host_id,
            size,
        }
    }
}

/// Map a container-facing ID to its host-facing ID.
///
/// An empty table is the identity mapping and returns `container_id`
/// unchanged.
///
/// # Errors
///
/// Returns [`IdMapError::Unmapped`] if a non-empty table has no range
/// covering `container_id`.
pub fn to_host(container_id: u32, maps: &[IdMap]) -> Result<u32> {
    if maps.is_empty() {
        return Ok(container_id);
    }

    for map in maps {
        if container_id >= map.container_id && container_id - map.container_id < map.size {
            return Ok(map.host_id + (container_id - map.container_id));
        }
    }

    Err(IdMapError::Unmapped { id: container_id })
}

/// Host identity of container root for the given tables.
///
/// Any valid mapping covers root. A table violating that invariant falls
/// back to 0 instead of failing, so a malformed table cannot block file
/// creation outright.
#[must_use]
pub fn root_pair(uid_maps: &[IdMap], gid_maps: &[IdMap]) -> (u32, u32) {
    let uid = to_host(0, uid_maps).unwrap_or(0);
    let gid = to_host(0, gid_maps).unwrap_or(0);
    (uid, gid)
}

/// Translate a file owner into the identity the container's mount namespace
/// should see.
///
/// Starts from the root identity of the mapping and independently overrides
/// each component that translates through its table; an untranslatable UID
/// does not block the GID, and vice versa.
#[must_use]
pub fn translate(uid: u32, gid: u32, uid_maps: &[IdMap], gid_maps: &[IdMap]) -> (u32, u32) {
    let (mut host_uid, mut host_gid) = root_pair(uid_maps, gid_maps);

    if let Ok(mapped) = to_host(uid, uid_maps) {
        host_uid = mapped;
    }
    if let Ok(mapped) = to_host(gid, gid_maps) {
        host_gid = mapped;
    }

    (host_uid, host_gid)
}
