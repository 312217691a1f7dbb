use stock_engine::TrackerError;
use telegram_tools::TelegramApiError;
use thiserror::Error;

/// Conditions that stop the monitor before its first cycle. Nothing that happens inside a cycle is fatal.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("No products are configured in {0}. There is nothing to monitor.")]
    ConfigUnavailable(String),
    #[error("Could not load the product snapshots. {0}")]
    TrackerError(#[from] TrackerError),
    #[error("Could not create the Telegram client. {0}")]
    ChannelInitialization(#[from] TelegramApiError),
    #[error("Could not create the HTTP client. {0}")]
    HttpClientInitialization(String),
    #[error("Invalid page selector. {0}")]
    InvalidSelector(String),
}
