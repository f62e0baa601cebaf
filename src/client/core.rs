use crate::config::Config;
use crate::drivers::GeminiDriver;
use crate::error::Error;
use crate::transport::{HttpTransport, TransportOptions};
use crate::types::message::Message;
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, info};

/// Reply of one chat completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatReply {
    /// Generated text; `None` when the provider answered without any.
    pub text: Option<String>,
    pub finish_reason: Option<String>,
}

impl ChatReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// The external chat completion call.
///
/// `history` is every prior message in order (never the placeholder); `text` is
/// the new user utterance, to be sent as the final user turn.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, history: &[Message], text: &str) -> Result<ChatReply>;
}

/// [`ChatBackend`] talking to the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    transport: HttpTransport,
    driver: GeminiDriver,
    api_key: Option<String>,
    temperature: Option<f64>,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let options = TransportOptions {
            connect_timeout: config.connect_timeout(),
            http_timeout: config.http_timeout(),
            proxy_url: config.proxy_url.clone(),
        };
        let transport = HttpTransport::new(&config.base_url, &options)?;
        info!(model = %config.model, base_url = %transport.base_url(), "gemini client ready");

        Ok(Self {
            transport,
            driver: GeminiDriver::new(config.model.clone()),
            api_key: config.usable_api_key().map(String::from),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    pub fn model(&self) -> &str {
        self.driver.model()
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn send(&self, history: &[Message], text: &str) -> Result<ChatReply> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::configuration("Gemini API key is not configured"))?;

        let request =
            self.driver
                .build_request(history, text, self.temperature, self.max_output_tokens);
        debug!(turns = history.len() + 1, "sending generateContent request");

        let response = self
            .transport
            .post_json(&request.path, &[("x-goog-api-key", api_key)], &request.body)
            .await?;

        if !response.is_success() {
            return Err(self.driver.parse_error(response.status, &response.body));
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)?;
        let parsed = self.driver.parse_response(&body);
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }

        Ok(ChatReply {
            text: parsed.content,
            finish_reason: parsed.finish_reason,
        })
    }
}
