use crate::{ResponseParameters, TelegramApiError};

const NOT_MODIFIED: &str = "message is not modified";
const EDIT_TARGET_MISSING: &str = "message to edit not found";

/// Map a failed Bot API response onto a [`TelegramApiError`].
///
/// Flood control is signalled with error code 429 and a `retry_after` parameter. Edit failures arrive as 400 Bad Request
/// and are told apart by their description, which is matched case-insensitively.
pub fn classify_api_error(
    error_code: Option<i64>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
) -> TelegramApiError {
    if let Some(retry_after) = parameters.and_then(|p| p.retry_after) {
        return TelegramApiError::RateLimited { retry_after };
    }
    let description = description.unwrap_or_default();
    let lower = description.to_lowercase();
    match error_code {
        Some(400) if lower.contains(NOT_MODIFIED) => TelegramApiError::MessageNotModified,
        Some(400) if lower.contains(EDIT_TARGET_MISSING) => TelegramApiError::MessageToEditNotFound,
        Some(code) => TelegramApiError::ApiError { code, description },
        None => TelegramApiError::ApiError { code: 0, description },
    }
}
