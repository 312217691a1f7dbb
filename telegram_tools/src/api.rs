use std::sync::Arc;

use log::*;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

use crate::{
    config::TelegramConfig,
    data_objects::{ApiResponse, Message, Update},
    helpers::classify_api_error,
    TelegramApiError,
};

#[derive(Clone)]
pub struct TelegramApi {
    config: TelegramConfig,
    client: Arc<Client>,
}

impl TelegramApi {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramApiError> {
        if config.bot_token.is_empty() {
            return Err(TelegramApiError::Initialization("No bot token was provided".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TelegramApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn chat_id(&self) -> &str {
        self.config.chat_id.as_str()
    }

    /// Call a Bot API method with a JSON body, unwrapping the response envelope.
    pub async fn bot_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, TelegramApiError> {
        trace!("Calling Bot API method {method}");
        let response = self.client.post(self.url(method)).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                TelegramApiError::Timeout(strip_token(&e.to_string(), self.config.bot_token.reveal()))
            } else {
                TelegramApiError::Transport(strip_token(&e.to_string(), self.config.bot_token.reveal()))
            }
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TelegramApiError::Timeout(e.to_string())
            } else {
                TelegramApiError::Transport(e.to_string())
            }
        })?;
        trace!("Bot API method {method} returned {status}");
        let envelope = serde_json::from_str::<ApiResponse<T>>(&text)
            .map_err(|e| TelegramApiError::JsonError(format!("{e}. HTTP status {status}")))?;
        if envelope.ok {
            envelope.result.ok_or(TelegramApiError::EmptyResponse)
        } else {
            Err(classify_api_error(envelope.error_code, envelope.description, envelope.parameters))
        }
    }

    pub fn url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.config.api_url.trim_end_matches('/'), self.config.bot_token.reveal())
    }

    pub async fn send_message(&self, text: &str) -> Result<Message, TelegramApiError> {
        let body = json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        let message = self.bot_query::<Message, Value>("sendMessage", &body).await?;
        debug!("Sent message #{} to chat {}", message.message_id, self.config.chat_id);
        Ok(message)
    }

    /// Replace the text of an earlier message. Bots get `true` back instead of a message for inline messages, so the
    /// result is discarded.
    pub async fn edit_message_text(&self, message_id: i64, text: &str) -> Result<(), TelegramApiError> {
        let body = json!({
            "chat_id": self.config.chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
        });
        let _ = self.bot_query::<Value, Value>("editMessageText", &body).await?;
        debug!("Edited message #{message_id} in chat {}", self.config.chat_id);
        Ok(())
    }

    pub async fn get_updates(&self, limit: usize) -> Result<Vec<Update>, TelegramApiError> {
        let body = json!({ "limit": limit });
        let updates = self.bot_query::<Vec<Update>, Value>("getUpdates", &body).await?;
        trace!("Fetched {} updates", updates.len());
        Ok(updates)
    }
}

// reqwest includes the request URL (and therefore the bot token) in its error messages.
fn strip_token(message: &str, token: &str) -> String {
    if token.is_empty() {
        message.to_string()
    } else {
        message.replace(token, "****")
    }
}
