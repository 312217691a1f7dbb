use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use log::*;
use tempfile::NamedTempFile;

use crate::{
    stock_types::SnapshotMap,
    traits::{SnapshotStore, StoreError},
};

/// Persists snapshots as a single pretty-printed JSON document.
///
/// Saves go to a temporary file in the same directory which then replaces the document in one rename, so a reader never
/// sees a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

impl SnapshotStore for JsonFileStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn load(&self) -> Result<SnapshotMap, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("💾️ {} does not exist yet. Starting with no snapshots.", self.display_path());
                return Ok(SnapshotMap::new());
            },
            Err(e) => return Err(StoreError::Io { path: self.display_path(), message: e.to_string() }),
        };
        if content.trim().is_empty() {
            warn!("💾️ {} is empty. Starting with no snapshots.", self.display_path());
            return Ok(SnapshotMap::new());
        }
        let snapshots = serde_json::from_str::<SnapshotMap>(&content)
            .map_err(|e| StoreError::Corrupt { path: self.display_path(), message: e.to_string() })?;
        debug!("💾️ Loaded {} snapshots from {}", snapshots.len(), self.display_path());
        Ok(snapshots)
    }

    async fn save(&self, snapshots: &SnapshotMap) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(snapshots).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::Io { path: self.display_path(), message: e.to_string() })?
            .map_err(|e| StoreError::Io { path: self.display_path(), message: e.to_string() })?;
        trace!("💾️ Saved {} snapshots to {}", snapshots.len(), self.display_path());
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
