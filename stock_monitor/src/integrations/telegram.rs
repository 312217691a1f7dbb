use std::time::Duration;

use log::*;
use stock_engine::{
    stock_types::NotificationHandle,
    traits::{ChannelError, MessagingChannel},
};
use telegram_tools::{TelegramApi, TelegramApiError};

/// Delivers notifications to a Telegram chat through the Bot API.
#[derive(Clone)]
pub struct TelegramChannel {
    api: TelegramApi,
}

impl TelegramChannel {
    pub fn new(api: TelegramApi) -> Self {
        Self { api }
    }
}

impl MessagingChannel for TelegramChannel {
    async fn send_message(&self, body: &str) -> Result<NotificationHandle, ChannelError> {
        let message = self.api.send_message(body).await.map_err(channel_error)?;
        Ok(NotificationHandle(message.message_id))
    }

    async fn edit_message(&self, handle: NotificationHandle, body: &str) -> Result<(), ChannelError> {
        self.api.edit_message_text(handle.0, body).await.map_err(channel_error)
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<String>, ChannelError> {
        let updates = self.api.get_updates(limit).await.map_err(channel_error)?;
        let texts = updates.iter().filter_map(|u| u.text()).map(String::from).collect::<Vec<String>>();
        trace!("📨️ {} of the last {} updates carry text", texts.len(), updates.len());
        Ok(texts)
    }
}

/// Classify a Bot API failure for the dispatcher. Only timeouts are worth retrying; connection, DNS and TLS failures
/// abort the delivery.
pub fn channel_error(e: TelegramApiError) -> ChannelError {
    match e {
        TelegramApiError::Timeout(s) => ChannelError::TransientTransport(s),
        TelegramApiError::RateLimited { retry_after } => {
            ChannelError::RateLimited { retry_after: Duration::from_secs(retry_after) }
        },
        TelegramApiError::MessageNotModified => ChannelError::NoopSuccess,
        TelegramApiError::MessageToEditNotFound => ChannelError::TargetGone,
        e => ChannelError::PermanentRejection(e.to_string()),
    }
}
