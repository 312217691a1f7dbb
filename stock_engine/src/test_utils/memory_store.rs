use std::sync::{Arc, Mutex};

use crate::{
    stock_types::SnapshotMap,
    traits::{SnapshotStore, StoreError},
};

#[derive(Default)]
struct StoreState {
    document: Option<SnapshotMap>,
    saves: usize,
    fail_saves: bool,
}

/// An in-memory [`SnapshotStore`]. Clones share the same underlying document, so a test can keep one clone to inspect
/// what the engine persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a persisted document.
    pub fn with_snapshots(snapshots: SnapshotMap) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().document = Some(snapshots);
        store
    }

    pub fn persisted(&self) -> Option<SnapshotMap> {
        self.state.lock().unwrap().document.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().unwrap().saves
    }

    pub fn fail_saves(&self, fail: bool) {
        self.state.lock().unwrap().fail_saves = fail;
    }
}

impl SnapshotStore for MemoryStore {
    fn exists(&self) -> bool {
        self.state.lock().unwrap().document.is_some()
    }

    async fn load(&self) -> Result<SnapshotMap, StoreError> {
        Ok(self.persisted().unwrap_or_default())
    }

    async fn save(&self, snapshots: &SnapshotMap) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_saves {
            return Err(StoreError::Io { path: "memory".to_string(), message: "Disk full".to_string() });
        }
        state.document = Some(snapshots.clone());
        state.saves += 1;
        Ok(())
    }
}
