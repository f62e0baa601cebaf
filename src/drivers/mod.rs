//! Provider 驱动：把对话历史转换为厂商请求格式并解析响应
//!
//! Provider request/response shaping. Only the Gemini `generateContent` format
//! is implemented; the HTTP exchange itself lives in [`crate::transport`].

pub mod gemini;

use serde_json::Value;

pub use gemini::GeminiDriver;

/// Provider request ready to be posted.
#[derive(Debug, Clone)]
pub struct DriverRequest {
    /// Path appended to the configured base URL.
    pub path: String,
    /// Serialized JSON request body.
    pub body: Value,
}

/// Unified chat response from provider.
#[derive(Debug, Clone)]
pub struct DriverResponse {
    /// Extracted text content.
    pub content: Option<String>,
    /// Finish reason normalized to lowercase (`stop`, `length`, `content_filter`, ...).
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}
