use crate::stock_types::OperatorConfig;

#[allow(async_fn_in_trait)]
pub trait OperatorConfigSource {
    /// Load the current operator settings. A missing or unreadable document yields an empty configuration.
    async fn load_settings(&self) -> OperatorConfig;
}
