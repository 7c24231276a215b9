//! Injection of host registration credentials into a container.
//!
//! Runs once per container at creation time, before start. Scans the fixed
//! host credential paths, materializes each discovery into an internal
//! secret plus a reference, and swaps the container's secret store for an
//! overlay that answers the new identifiers and falls back to the previous
//! store for everything else.
//!
//! Injection is fail-closed: if a scan fails, the container is left
//! untouched and its creation must fail, so software inside the container
//! never starts with a partial credential set.

use std::path::Path;
use std::sync::Arc;

use idmap::IdMap;
use tracing::{error, info};

use crate::error::Result;
use crate::scan::scan_path;
use crate::store::{OverlayStore, SecretStore};
use crate::types::{SecretFile, SecretReference};

/// Host prefix holding the service credential directory.
const ZYPP_PREFIX: &str = "/etc/zypp";
/// Credential directory below [`ZYPP_PREFIX`], scanned recursively.
const CREDENTIALS_DIR: &str = "credentials.d";
/// Host prefix holding the registration configuration file.
const ETC_PREFIX: &str = "/etc";
/// Registration configuration file below [`ETC_PREFIX`].
const REGISTRATION_FILE: &str = "SUSEConnect";

/// The slice of a container the injector works against: its current
/// secret-resolution capability, its reference list, and the UID/GID
/// mapping tables of its user namespace.
pub struct Container {
    /// Container identifier, used for logging only.
    pub id: String,
    /// The secret-resolution capability; replaced by injection.
    pub secret_store: Arc<dyn SecretStore>,
    /// References the mount pipeline materializes at start; appended to,
    /// never reordered or truncated.
    pub secret_references: Vec<SecretReference>,
    /// UID mapping table of the container's user namespace.
    pub uid_maps: Vec<IdMap>,
    /// GID mapping table of the container's user namespace.
    pub gid_maps: Vec<IdMap>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.id)
            .field("secret_store", &"<secret store>")
            .field("secret_references", &self.secret_references.len())
            .field("uid_maps", &self.uid_maps)
            .field("gid_maps", &self.gid_maps)
            .finish()
    }
}

/// Log that host credential injection is active.
///
/// The embedding runtime calls this once during daemon startup, so the log
/// records that containers on this host receive injected credentials.
pub fn announce_enabled() {
    info!("host credential secret injection enabled");
}

/// Collect every host credential destined for injection.
///
/// Consults the service credential directory and the registration file. A
/// missing root contributes zero records; any other failure aborts.
pub fn host_secret_files() -> Result<Vec<SecretFile>> {
    scan_roots(Path::new(ZYPP_PREFIX), Path::new(ETC_PREFIX))
}

fn scan_roots(zypp_prefix: &Path, etc_prefix: &Path) -> Result<Vec<SecretFile>> {
    let mut records = scan_path(zypp_prefix, Path::new(CREDENTIALS_DIR)).map_err(|err| {
        error!(error = %err, "failed to scan service credentials");
        err
    })?;

    let registration = scan_path(etc_prefix, Path::new(REGISTRATION_FILE)).map_err(|err| {
        error!(error = %err, "failed to scan registration file");
        err
    })?;
    records.extend(registration);

    Ok(records)
}

/// Inject the host credential secrets into `container`.
///
/// Scans the fixed host paths, then installs a fully built [`OverlayStore`]
/// as the container's secret store (fallback: the store installed before)
/// and appends one reference per secret to the container's reference list.
///
/// Invoked exactly once per container, at creation time, before start.
///
/// # Errors
///
/// Propagates any scan failure unmodified; the container is not mutated in
/// that case.
pub fn inject_secret_store(container: &mut Container) -> Result<()> {
    let records = host_secret_files()?;
    inject_records(container, &records);
    Ok(())
}

fn inject_records(container: &mut Container, records: &[SecretFile]) {
    // The overlay is complete before anything can observe it; the swap of
    // the store is the last step.
    let secrets = records.iter().map(SecretFile::to_secret);
    let overlay = OverlayStore::new(Arc::clone(&container.secret_store), secrets);

    for record in records {
        container
            .secret_references
            .push(record.to_reference(&container.uid_maps, &container.gid_maps));
    }

    let count = overlay.len();
    container.secret_store = Arc::new(overlay);
    info!(
        container = %container.id,
        secrets = count,
        "installed host credential secret overlay"
    );
}
