//! # Telegram tools
//!
//! A small client for the parts of the Telegram Bot API the stock monitor needs:
//! * `sendMessage` to post a new notification,
//! * `editMessageText` to keep an earlier notification in sync,
//! * `getUpdates` for a short lookback over recent traffic.
//!
//! API failures are classified into [`TelegramApiError`] variants so that callers can tell timeouts, rate limits and
//! "message is not modified" style rejections apart without string matching.
mod api;
mod config;
mod data_objects;
mod error;

pub mod helpers;

pub use api::TelegramApi;
pub use config::TelegramConfig;
pub use data_objects::{ApiResponse, Chat, Message, ResponseParameters, Update};
pub use error::TelegramApiError;
