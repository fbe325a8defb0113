use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::models::Snapshot;

/// Holder of the currently published snapshot.
///
/// One writer (the refresh scheduler) swaps in whole snapshots; any number of
/// readers load the current one without locking. Clones share the same slot.
#[derive(Clone)]
pub struct SnapshotCache {
    current: Arc<ArcSwap<Snapshot>>,
}

impl SnapshotCache {
    /// Create a cache holding the uninitialized sentinel
    pub fn new() -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(Snapshot::uninitialized())),
        }
    }

    /// Replace the visible snapshot
    pub fn store(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Current snapshot
    pub fn load(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    pub fn is_initialized(&self) -> bool {
        self.current.load().is_initialized()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
