use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("The snapshot store failed. {0}")]
    StoreError(#[from] StoreError),
}
