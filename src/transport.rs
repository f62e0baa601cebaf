//! HTTP transport for the chat backend.
//!
//! Owns the `reqwest` client and turns low-level failures into
//! [`TransportError`] variants the failure classifier can tell apart.

pub mod http;

pub use http::{HttpResponse, HttpTransport, TransportOptions};

/// Transport-level failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The host name could not be resolved.
    #[error("unable to resolve host: {0}")]
    Dns(String),

    /// TCP/TLS connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Socket-level timeout raised by the HTTP client itself.
    #[error("socket timed out: {0}")]
    Timeout(String),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Sort a `reqwest` error into the transport taxonomy.
    ///
    /// Checked in order: timeout, DNS resolution, connect, everything else.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if is_dns_failure(&err) {
            TransportError::Dns(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Http(err)
        }
    }
}

const DNS_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "Name or service not known",
    "No such host is known",
    "nodename nor servname provided",
];

fn is_dns_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if DNS_MARKERS.iter().any(|m| text.contains(m)) {
            return true;
        }
        current = e.source();
    }
    false
}
