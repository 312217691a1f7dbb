use thiserror::Error;

use crate::stock_types::SnapshotMap;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("I/O error on {path}. {message}")]
    Io { path: String, message: String },
    #[error("The snapshot document at {path} is corrupt. {message}")]
    Corrupt { path: String, message: String },
    #[error("Could not serialize snapshots. {0}")]
    Serialization(String),
}

#[allow(async_fn_in_trait)]
pub trait SnapshotStore {
    /// Whether a persisted document exists at all. When it does not, the first pass over the catalog is a cold start.
    fn exists(&self) -> bool;
    /// Load every snapshot. A store with no persisted document loads as empty.
    async fn load(&self) -> Result<SnapshotMap, StoreError>;
    /// Replace the persisted snapshots with `snapshots`. Readers of the persisted medium must never observe a partially
    /// written mapping.
    async fn save(&self, snapshots: &SnapshotMap) -> Result<(), StoreError>;
}
