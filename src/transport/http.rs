use super::TransportError;
use crate::Result;
use reqwest::Proxy;
use std::time::Duration;
use tracing::debug;

/// Knobs for the underlying `reqwest` client.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Socket connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout enforced by the HTTP client.
    pub http_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            http_timeout: Duration::from_secs(60),
            proxy_url: None,
        }
    }
}

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, options: &TransportOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.http_timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = options.proxy_url.as_deref() {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| crate::Error::configuration(format!("invalid proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        } else {
            // Only an explicitly configured proxy is used.
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and return status plus raw body text.
    ///
    /// Non-2xx statuses are not errors at this layer; the caller decides how to
    /// interpret the body.
    pub async fn post_json(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<HttpResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");

        let mut request = self.client.post(&url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::from_reqwest(e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::from_reqwest(e)))?;

        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, body })
    }
}
