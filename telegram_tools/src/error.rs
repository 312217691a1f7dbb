use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelegramApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("The request timed out. {0}")]
    Timeout(String),
    #[error("Could not reach the Bot API: {0}")]
    Transport(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Flood control exceeded. Retry in {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    #[error("The message is not modified")]
    MessageNotModified,
    #[error("The message to edit was not found")]
    MessageToEditNotFound,
    #[error("Request failed. Error {code}. {description}")]
    ApiError { code: i64, description: String },
    #[error("The Bot API returned an empty result")]
    EmptyResponse,
}
