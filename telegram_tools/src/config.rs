use std::time::Duration;

use log::*;
use sm_common::{helpers::env_seconds, Secret};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: Secret<String>,
    /// The chat (or channel) that notifications are posted to.
    pub chat_id: String,
    pub api_url: String,
    /// Per-request timeout. Timed out requests surface as [`crate::TelegramApiError::Timeout`].
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: Secret::default(),
            chat_id: String::default(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TelegramConfig {
    pub fn new_from_env_or_default() -> Self {
        let bot_token = Secret::new(std::env::var("SM_TELEGRAM_TOKEN").unwrap_or_else(|_| {
            warn!("🪛️ SM_TELEGRAM_TOKEN not set. Notifications cannot be delivered without a bot token.");
            String::default()
        }));
        let chat_id = std::env::var("SM_TELEGRAM_CHAT_ID").unwrap_or_else(|_| {
            warn!("🪛️ SM_TELEGRAM_CHAT_ID not set. Notifications cannot be delivered without a destination chat.");
            String::default()
        });
        let api_url = std::env::var("SM_TELEGRAM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout = env_seconds("SM_TIMEOUT", DEFAULT_TIMEOUT);
        Self { bot_token, chat_id, api_url, timeout }
    }
}
