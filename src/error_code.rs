//! 用户可见的失败类别：每个类别对应一个稳定的错误码和一条提示文本。
//!
//! User-facing failure categories.
//!
//! Every failed submission is reduced to one [`ChatErrorCode`], which carries a
//! stable code string, a snake_case name, a category and the text shown in the
//! conversation.
//!
//! | Prefix | Category     | Description                          |
//! |--------|--------------|--------------------------------------|
//! | E1xxx  | client       | Local configuration problems         |
//! | E2xxx  | network      | Timeouts and connectivity failures   |
//! | E3xxx  | auth         | Credential and permission failures   |
//! | E4xxx  | rate         | Quota and resource limits            |
//! | E5xxx  | server       | Provider-side failures               |
//! | E9xxx  | unknown      | Catch-all / unclassified             |
//!
//! ```rust
//! use gemini_chat::ChatErrorCode;
//!
//! let code = ChatErrorCode::QuotaExceeded;
//! assert_eq!(code.code(), "E4001");
//! assert_eq!(code.category(), "rate");
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatErrorCode {
    /// E1001: API key missing or left at the placeholder value
    Configuration,
    /// E1002: Provider answered without usable text
    EmptyResponse,
    /// E2001: The orchestrator's bound elapsed
    Timeout,
    /// E2002: Host name could not be resolved
    HostUnreachable,
    /// E2003: Connection refused or failed
    ConnectionFailed,
    /// E2004: Socket-level timeout inside the HTTP client
    ConnectionTimedOut,
    /// E3001: API key rejected
    InvalidApiKey,
    /// E3002: Key valid but not allowed to use the resource
    PermissionDenied,
    /// E3003: Request carried no valid credentials
    Unauthenticated,
    /// E4001: Usage quota reached
    QuotaExceeded,
    /// E4002: Resource exhausted (rate or capacity)
    ResourceExhausted,
    /// E5001: Configured model does not exist
    ModelNotFound,
    /// E5002: Internal error on provider side
    InternalServerError,
    /// E5003: Provider temporarily unavailable
    ServiceUnavailable,
    /// E9999: Error could not be classified
    Unknown,
}

impl ChatErrorCode {
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration => "E1001",
            Self::EmptyResponse => "E1002",
            Self::Timeout => "E2001",
            Self::HostUnreachable => "E2002",
            Self::ConnectionFailed => "E2003",
            Self::ConnectionTimedOut => "E2004",
            Self::InvalidApiKey => "E3001",
            Self::PermissionDenied => "E3002",
            Self::Unauthenticated => "E3003",
            Self::QuotaExceeded => "E4001",
            Self::ResourceExhausted => "E4002",
            Self::ModelNotFound => "E5001",
            Self::InternalServerError => "E5002",
            Self::ServiceUnavailable => "E5003",
            Self::Unknown => "E9999",
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::EmptyResponse => "empty_response",
            Self::Timeout => "timeout",
            Self::HostUnreachable => "host_unreachable",
            Self::ConnectionFailed => "connection_failed",
            Self::ConnectionTimedOut => "connection_timed_out",
            Self::InvalidApiKey => "invalid_api_key",
            Self::PermissionDenied => "permission_denied",
            Self::Unauthenticated => "unauthenticated",
            Self::QuotaExceeded => "quota_exceeded",
            Self::ResourceExhausted => "resource_exhausted",
            Self::ModelNotFound => "model_not_found",
            Self::InternalServerError => "internal_server_error",
            Self::ServiceUnavailable => "service_unavailable",
            Self::Unknown => "unknown",
        }
    }

    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration | Self::EmptyResponse => "client",
            Self::Timeout
            | Self::HostUnreachable
            | Self::ConnectionFailed
            | Self::ConnectionTimedOut => "network",
            Self::InvalidApiKey | Self::PermissionDenied | Self::Unauthenticated => "auth",
            Self::QuotaExceeded | Self::ResourceExhausted => "rate",
            Self::ModelNotFound | Self::InternalServerError | Self::ServiceUnavailable => "server",
            Self::Unknown => "unknown",
        }
    }

    /// Text appended to the conversation for this category.
    ///
    /// [`ChatErrorCode::Unknown`] is normally rendered with the raw error text
    /// instead; see [`crate::classify`].
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration => {
                "API key is not configured. Set GEMINI_API_KEY and restart the chat."
            }
            Self::EmptyResponse => {
                "The model returned an empty response. Try rephrasing your message."
            }
            Self::Timeout => "The request timed out. Please try again.",
            Self::HostUnreachable => {
                "Cannot reach servers. Please check your internet connection."
            }
            Self::ConnectionFailed => "Connection failed. Please check your network and try again.",
            Self::ConnectionTimedOut => {
                "Connection timed out. The server may be busy, please try again later."
            }
            Self::InvalidApiKey => "Invalid API key. Please check your configuration.",
            Self::PermissionDenied => {
                "Permission denied. Your API key does not have access to this model."
            }
            Self::Unauthenticated => "Authentication failed. Please check your API key.",
            Self::QuotaExceeded => "API quota exceeded. Please try again later.",
            Self::ResourceExhausted => {
                "Too many requests, resources are exhausted. Please wait a moment and try again."
            }
            Self::ModelNotFound => "Model not found. Please check the configured model name.",
            Self::InternalServerError => {
                "The server encountered an internal error. Please try again later."
            }
            Self::ServiceUnavailable => {
                "The service is temporarily unavailable. Please try again later."
            }
            Self::Unknown => "An unknown error occurred.",
        }
    }
}

impl fmt::Display for ChatErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ChatErrorCode] = &[
        ChatErrorCode::Configuration,
        ChatErrorCode::EmptyResponse,
        ChatErrorCode::Timeout,
        ChatErrorCode::HostUnreachable,
        ChatErrorCode::ConnectionFailed,
        ChatErrorCode::ConnectionTimedOut,
        ChatErrorCode::InvalidApiKey,
        ChatErrorCode::PermissionDenied,
        ChatErrorCode::Unauthenticated,
        ChatErrorCode::QuotaExceeded,
        ChatErrorCode::ResourceExhausted,
        ChatErrorCode::ModelNotFound,
        ChatErrorCode::InternalServerError,
        ChatErrorCode::ServiceUnavailable,
        ChatErrorCode::Unknown,
    ];

    #[test]
    fn codes_and_messages_are_distinct() {
        let codes: std::collections::HashSet<_> = ALL.iter().map(|c| c.code()).collect();
        let messages: std::collections::HashSet<_> =
            ALL.iter().map(|c| c.user_message()).collect();
        assert_eq!(codes.len(), ALL.len());
        assert_eq!(messages.len(), ALL.len());
    }

    #[test]
    fn display_is_code() {
        assert_eq!(ChatErrorCode::ModelNotFound.to_string(), "E5001");
        assert_eq!(ChatErrorCode::HostUnreachable.category(), "network");
    }
}
