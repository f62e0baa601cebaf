//! Chat configuration
//!
//! Loaded from an optional YAML file, then overridden by environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GEMINI_API_KEY` | `api_key` |
//! | `GEMINI_MODEL` | `model` |
//! | `GEMINI_BASE_URL` | `base_url` |
//! | `CHAT_REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |
//! | `CHAT_CONNECT_TIMEOUT_SECS` | `connect_timeout_secs` |
//! | `CHAT_HTTP_TIMEOUT_SECS` | `http_timeout_secs` |
//! | `CHAT_PROXY_URL` | `proxy_url` |

use crate::error::{Error, ErrorContext};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Literal value shipped in sample configs; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Bound on one whole submission's backend call.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Timeout enforced by the HTTP client itself.
    pub http_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: 10,
            http_timeout_secs: 60,
            temperature: None,
            max_output_tokens: None,
            proxy_url: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("proxy_url", &self.proxy_url)
            .finish()
    }
}

impl Config {
    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Optional YAML file, then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::parse_yaml(&std::fs::read_to_string(p)?)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config = Self::parse_yaml(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply overrides from `lookup` (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GEMINI_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("GEMINI_MODEL") {
            self.model = v;
        }
        if let Some(v) = lookup("GEMINI_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("CHAT_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_secs("CHAT_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("CHAT_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = parse_secs("CHAT_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("CHAT_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_secs("CHAT_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("CHAT_PROXY_URL") {
            self.proxy_url = Some(v).filter(|s| !s.trim().is_empty());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                "invalid base url",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string()),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "base url must use http or https",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(format!("scheme: {}", url.scheme())),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model name is empty",
                ErrorContext::new().with_field_path("model"),
            ));
        }
        for (field, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("http_timeout_secs", self.http_timeout_secs),
        ] {
            if secs == 0 {
                return Err(Error::configuration_with_context(
                    "timeout must be at least one second",
                    ErrorContext::new().with_field_path(field),
                ));
            }
        }
        Ok(())
    }

    /// The API key, unless it is missing, blank or the sample placeholder.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| is_usable_api_key(k))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Presence check only; the key format is never inspected.
pub fn is_usable_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != API_KEY_PLACEHOLDER
}

fn parse_secs(var: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| {
        Error::configuration_with_context(
            "expected a whole number of seconds",
            ErrorContext::new()
                .with_field_path(var)
                .with_details(format!("{:?}: {}", value, e))
                .with_source("env"),
        )
    })
}
