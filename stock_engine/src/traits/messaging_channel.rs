use std::time::Duration;

use thiserror::Error;

use crate::stock_types::NotificationHandle;

/// The failures a messaging channel can report. The dispatcher decides what to do with each of them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The call timed out. Retried up to the retry budget.
    #[error("The channel timed out. {0}")]
    TransientTransport(String),
    /// The channel asked us to back off. Retried after exactly `retry_after`, without spending the retry budget.
    #[error("The channel is rate limiting us. Retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },
    /// The message being edited no longer exists.
    #[error("The message to edit no longer exists")]
    TargetGone,
    /// The edit was rejected because the message already has exactly this content.
    #[error("The message already has this content")]
    NoopSuccess,
    #[error("The channel rejected the request. {0}")]
    PermanentRejection(String),
}

#[allow(async_fn_in_trait)]
pub trait MessagingChannel {
    /// Post a new message and return its handle.
    async fn send_message(&self, body: &str) -> Result<NotificationHandle, ChannelError>;
    /// Replace the body of an earlier message.
    async fn edit_message(&self, handle: NotificationHandle, body: &str) -> Result<(), ChannelError>;
    /// The bodies of (at most) the `limit` most recent messages the channel can see.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<String>, ChannelError>;
}
