//! Data model for host-sourced secrets.
//!
//! The scanner produces one [`SecretFile`] per regular file or directory it
//! discovers. Each record materializes into exactly one internal [`Secret`]
//! and one [`SecretReference`], both keyed by the same content-derived
//! identifier. Materialization is pure: no I/O, no mutation of the record.

use idmap::IdMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Identifier prefix marking secrets owned by this subsystem.
const ID_PREFIX: &str = "suse::";

/// Compute the `sha256:<hex>` digest of a byte slice.
pub(crate) fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// A host file or directory discovered by the scanner, destined to become a
/// container secret.
///
/// `path` is relative to the scan root (prefix stripped) and doubles as the
/// in-container file name. Directory records carry empty `data` and the
/// directory's own owner and mode.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretFile {
    /// Root-relative path, also the in-container target name.
    pub path: String,
    /// Host-side owning UID.
    pub uid: u32,
    /// Host-side owning GID.
    pub gid: u32,
    /// Permission bits, copied from the host file.
    pub mode: u32,
    /// File contents; empty for directories.
    pub data: Vec<u8>,
}

impl SecretFile {
    /// Content-derived identifier for this record.
    ///
    /// Stable for identical content at the same path; distinct across paths
    /// and across contents. Directories digest the empty byte sequence, so
    /// they still get a stable per-path identifier.
    #[must_use]
    pub fn secret_id(&self) -> String {
        format!("{ID_PREFIX}{}:{}", content_digest(&self.data), self.path)
    }

    /// Materialize the internal secret object for this record.
    #[must_use]
    pub fn to_secret(&self) -> Secret {
        Secret {
            id: self.secret_id(),
            internal: true,
            data: self.data.clone(),
        }
    }

    /// Materialize the reference describing how this secret is exposed to
    /// the container, re-mapping the host owner into the container's user
    /// namespace.
    #[must_use]
    pub fn to_reference(&self, uid_maps: &[IdMap], gid_maps: &[IdMap]) -> SecretReference {
        let (uid, gid) = idmap::translate(self.uid, self.gid, uid_maps, gid_maps);

        let id = self.secret_id();
        SecretReference {
            secret_name: id.clone(),
            secret_id: id,
            file: FileTarget {
                name: self.path.clone(),
                uid: uid.to_string(),
                gid: gid.to_string(),
                mode: self.mode,
            },
        }
    }
}

impl std::fmt::Debug for SecretFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretFile")
            .field("path", &self.path)
            .field("uid", &self.uid)
            .field("gid", &self.gid)
            .field("mode", &format_args!("{:04o}", self.mode))
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// An internal secret record: raw content bytes keyed by the derived
/// identifier.
///
/// Immutable once built. Debug output redacts the payload; [`Zeroize`] is
/// implemented for explicit cleanup by stores that drop secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret {
    /// The content-derived identifier this secret is stored under.
    pub id: String,
    /// Marks the secret as runtime-internal, invisible to API listings.
    pub internal: bool,
    /// Raw content bytes.
    pub data: Vec<u8>,
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("id", &self.id)
            .field("internal", &self.internal)
            .field("data", &"[REDACTED]")
            .finish()
    }
}

impl Zeroize for Secret {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

/// Where and how a secret is exposed inside the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTarget {
    /// In-container file name, relative to the secrets mount root.
    pub name: String,
    /// Owner UID as a decimal string, already namespace-translated.
    pub uid: String,
    /// Owner GID as a decimal string, already namespace-translated.
    pub gid: String,
    /// Permission bits for the exposed file.
    pub mode: u32,
}

/// A secret reference appended to the container's reference list.
///
/// The mount pipeline materializes these at container start, the same way it
/// honors any other secret reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretReference {
    pub secret_id: String,
    pub secret_name: String,
    pub file: FileTarget,
}
