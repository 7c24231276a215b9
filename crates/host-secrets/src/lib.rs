//! Host registration credential injection for container secret stores.
//!
//! Containers on a registered host should be able to consume the host's
//! service credentials at well-known in-container paths without the image or
//! the orchestrator knowing they exist. This crate discovers those
//! credentials on the host filesystem, packages each file and directory as
//! an immutable content-addressed secret, re-maps file ownership into the
//! container's user namespace, and overlays the result on the container's
//! existing secret store.
//!
//! ## Pieces
//!
//! - [`scan_path`]: recursive host filesystem scanner producing
//!   [`SecretFile`] records
//! - [`SecretFile`]: one discovered file or directory plus its metadata;
//!   materializes into a [`Secret`] and a [`SecretReference`]
//! - [`OverlayStore`]: answers injected identifiers, delegates everything
//!   else to the store it wraps
//! - [`inject_secret_store`]: the one-shot wiring performed at container
//!   creation time
//!
//! ## Failure model
//!
//! Injection is fail-closed: a scan error aborts container creation rather
//! than starting the container with a partial credential set. Missing scan
//! roots and dangling symlinks are the only tolerated conditions.

mod error;
mod inject;
mod scan;
mod store;
mod types;

pub use error::{Result, ScanError};
pub use inject::{announce_enabled, host_secret_files, inject_secret_store, Container};
pub use scan::scan_path;
pub use store::{OverlayStore, SecretStore};
pub use types::{FileTarget, Secret, SecretFile, SecretReference};
