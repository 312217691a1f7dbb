use thiserror::Error;

use crate::stock_types::ProductRecord;

/// Every variant means the same thing to the scheduler: skip this source for this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("The source could not be reached. {0}")]
    Unreachable(String),
    #[error("The source responded with HTTP status {0}")]
    UnexpectedStatus(u16),
    #[error("The page failed its identity check. Title was '{0}'")]
    IdentityMismatch(String),
}

#[allow(async_fn_in_trait)]
pub trait ProductSource {
    /// A short human-readable name for log messages, typically the URL.
    fn source_id(&self) -> String;
    /// Fetch the products currently listed by this source, in page order.
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, SourceError>;
}
