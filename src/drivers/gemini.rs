//! Gemini generateContent 驱动：请求/响应格式转换
//!
//! Google Gemini generateContent API driver:
//! - `contents` holds the turns, each with `role` (`user` / `model`) and `parts`.
//! - `generationConfig` wraps temperature and `maxOutputTokens`.
//! - Response text lives in `candidates[0].content.parts[*].text`.
//! - Errors come back as `{ "error": { "code", "message", "status" } }`.

use serde_json::Value;

use crate::error::Error;
use crate::types::message::{Message, Role};

use super::{DriverRequest, DriverResponse, UsageInfo};

#[derive(Debug, Clone)]
pub struct GeminiDriver {
    model: String,
}

impl GeminiDriver {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn turn(role: Role, text: &str) -> Value {
        serde_json::json!({
            "role": role.as_str(),
            "parts": [{ "text": text }],
        })
    }

    /// Build the request for `history` followed by the new user `text`.
    pub fn build_request(
        &self,
        history: &[Message],
        text: &str,
        temperature: Option<f64>,
        max_tokens: Option<u32>,
    ) -> DriverRequest {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|m| Self::turn(m.role, &m.text))
            .collect();
        contents.push(Self::turn(Role::User, text));

        let mut body = serde_json::json!({ "contents": contents });

        let mut gen_config = serde_json::Map::new();
        if let Some(t) = temperature {
            gen_config.insert("temperature".into(), serde_json::json!(t));
        }
        if let Some(mt) = max_tokens {
            gen_config.insert("maxOutputTokens".into(), serde_json::json!(mt));
        }
        if !gen_config.is_empty() {
            body["generationConfig"] = Value::Object(gen_config);
        }

        DriverRequest {
            path: format!("/v1beta/models/{}:generateContent", self.model),
            body,
        }
    }

    /// Parse a successful `generateContent` body.
    ///
    /// A response without candidates (e.g. a blocked prompt) yields `content: None`.
    pub fn parse_response(&self, body: &Value) -> DriverResponse {
        let content = body
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .filter(|s| !s.is_empty());

        let finish_reason = body
            .pointer("/candidates/0/finishReason")
            .and_then(|v| v.as_str())
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" | "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            });

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        DriverResponse {
            content,
            finish_reason,
            usage,
        }
    }

    /// Turn a non-2xx response into [`Error::Remote`].
    ///
    /// `class` is Gemini's `error.status` (e.g. `PERMISSION_DENIED`) when present.
    pub fn parse_error(&self, status: u16, body: &str) -> Error {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|v| v.get("error"));

        let class = error
            .and_then(|e| e.get("status"))
            .and_then(|s| s.as_str())
            .map(String::from)
            .unwrap_or_else(|| "http_error".to_string());

        let mut message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| body.trim().to_string());

        // Machine-readable reasons such as API_KEY_INVALID sit in `details`.
        let reasons: Vec<&str> = error
            .and_then(|e| e.get("details"))
            .and_then(|d| d.as_array())
            .map(|details| {
                details
                    .iter()
                    .filter_map(|d| d.get("reason").and_then(|r| r.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        if !reasons.is_empty() {
            message = format!("{} [{}]", message, reasons.join(", "));
        }

        Error::Remote {
            status,
            class,
            message,
        }
    }
}
