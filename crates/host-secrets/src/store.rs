//! Secret resolution and the host-secret overlay.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::types::Secret;

/// A container's secret-resolution capability.
///
/// The runtime resolves the identifiers in a container's reference list
/// through this trait when it mounts secrets at start time. Implementations
/// must tolerate concurrent readers; nothing mutates a store once it is
/// installed on a container.
pub trait SecretStore: Send + Sync {
    /// Resolve an identifier to its secret, or `None` if unknown.
    fn get(&self, id: &str) -> Option<Secret>;
}

/// Overlay of host-injected secrets on top of an existing store.
///
/// Fully populated at construction and read-only afterwards. Lookups for
/// identifiers owned by this subsystem are answered from the overlay's own
/// map; everything else is delegated unchanged to the wrapped fallback,
/// including its miss behavior. The overlay never fabricates results.
pub struct OverlayStore {
    secrets: HashMap<String, Secret>,
    fallback: Arc<dyn SecretStore>,
}

impl OverlayStore {
    /// Build an overlay answering for `secrets`, delegating every other
    /// identifier to `fallback`.
    pub fn new(fallback: Arc<dyn SecretStore>, secrets: impl IntoIterator<Item = Secret>) -> Self {
        let secrets = secrets
            .into_iter()
            .map(|secret| (secret.id.clone(), secret))
            .collect();
        Self { secrets, fallback }
    }

    /// Number of secrets the overlay answers for itself.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// True if the overlay adds no secrets of its own.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl SecretStore for OverlayStore {
    fn get(&self, id: &str) -> Option<Secret> {
        debug!(id, "secret requested from host credential overlay");

        match self.secrets.get(id) {
            Some(secret) => Some(secret.clone()),
            None => self.fallback.get(id),
        }
    }
}

impl std::fmt::Debug for OverlayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStore")
            .field("secrets", &self.secrets.len())
            .field("fallback", &"<secret store>")
            .finish()
    }
}
