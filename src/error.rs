use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Structured error context for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key that caused the error (e.g., "base_url", "api_key")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected format, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "env", "config_file")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for chat operations.
///
/// Every failure a submission can hit ends up here, and the classifier in
/// [`crate::client::error_classification`] maps each one to a user-facing message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// The orchestrator's own bound elapsed before the backend answered.
    #[error("Request timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Remote error: HTTP {status} ({class}): {message}")]
    Remote {
        status: u16,
        class: String,
        message: String,
    },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The owning session was closed while the submission was pending.
    #[error("Session closed")]
    Cancelled,

    #[error("{message}")]
    Unknown { message: String },
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn unknown(msg: impl Into<String>) -> Self {
        Error::Unknown {
            message: msg.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Raw text carried by the error, without the category prefix.
    ///
    /// Used by the classifier fallback so the user sees the upstream wording.
    pub fn raw_message(&self) -> String {
        match self {
            Error::Unknown { message } => message.trim().to_string(),
            Error::Remote { message, .. } if !message.trim().is_empty() => {
                message.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_renders_context() {
        let err = Error::configuration_with_context(
            "invalid base url",
            ErrorContext::new()
                .with_field_path("base_url")
                .with_source("env"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid base url (field: base_url, source: env)"
        );
        assert_eq!(err.context().and_then(|c| c.field_path.as_deref()), Some("base_url"));
    }

    #[test]
    fn raw_message_strips_prefixes() {
        let err = Error::Remote {
            status: 500,
            class: "INTERNAL".into(),
            message: "  backend exploded ".into(),
        };
        assert_eq!(err.raw_message(), "backend exploded");
        assert_eq!(Error::unknown("").raw_message(), "");
    }

    #[test]
    fn timeout_display_uses_seconds() {
        let err = Error::Timeout {
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Request timed out after 30s");
    }
}
