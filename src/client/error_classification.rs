//! Error classification logic
//!
//! Maps any [`Error`] to a [`ChatErrorCode`] and the text appended to the
//! conversation. First match wins:
//!
//! 1. the session's own timeout,
//! 2. DNS failure, 3. connect failure, 4. socket-level timeout,
//! 5. local configuration / empty response,
//! 6. case-sensitive substrings of the error text, in table order,
//! 7. fallback to the raw error text.

use crate::error::Error;
use crate::error_code::ChatErrorCode;
use crate::transport::TransportError;

/// Substring table over the error's display text. Order matters: quota
/// messages arrive with a `RESOURCE_EXHAUSTED` status and must win over it.
const MESSAGE_PATTERNS: &[(&[&str], ChatErrorCode)] = &[
    (
        &["API_KEY_INVALID", "API key not valid"],
        ChatErrorCode::InvalidApiKey,
    ),
    (&["PERMISSION_DENIED"], ChatErrorCode::PermissionDenied),
    (
        &["Quota exceeded", "QUOTA_EXCEEDED", "exceeded your current quota"],
        ChatErrorCode::QuotaExceeded,
    ),
    (&["RESOURCE_EXHAUSTED"], ChatErrorCode::ResourceExhausted),
    (&["NOT_FOUND", "is not found"], ChatErrorCode::ModelNotFound),
    (&["UNAUTHENTICATED"], ChatErrorCode::Unauthenticated),
    (&["INTERNAL"], ChatErrorCode::InternalServerError),
    (
        &["UNAVAILABLE", "Service Unavailable"],
        ChatErrorCode::ServiceUnavailable,
    ),
];

/// Category of `error`.
pub fn classify_code(error: &Error) -> ChatErrorCode {
    match error {
        Error::Timeout { .. } => return ChatErrorCode::Timeout,
        Error::Transport(TransportError::Dns(_)) => return ChatErrorCode::HostUnreachable,
        Error::Transport(TransportError::Connect(_)) => return ChatErrorCode::ConnectionFailed,
        Error::Transport(TransportError::Timeout(_)) => {
            return ChatErrorCode::ConnectionTimedOut
        }
        Error::Configuration { .. } => return ChatErrorCode::Configuration,
        Error::EmptyResponse => return ChatErrorCode::EmptyResponse,
        _ => {}
    }

    let text = error.to_string();
    MESSAGE_PATTERNS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| text.contains(n)))
        .map(|(_, code)| *code)
        .unwrap_or(ChatErrorCode::Unknown)
}

/// Human-readable message for `error`, as appended to the conversation.
pub fn classify(error: &Error) -> String {
    match (classify_code(error), error) {
        (ChatErrorCode::Timeout, Error::Timeout { after }) => format!(
            "The request timed out after {} seconds. Please try again.",
            after.as_secs()
        ),
        (ChatErrorCode::Unknown, _) => {
            let raw = error.raw_message();
            if raw.is_empty() {
                ChatErrorCode::Unknown.user_message().to_string()
            } else {
                format!("Error: {}", raw)
            }
        }
        (code, _) => code.user_message().to_string(),
    }
}
