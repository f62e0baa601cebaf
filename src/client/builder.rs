use crate::client::core::{ChatBackend, GeminiClient};
use crate::client::session::{ChatSession, SessionInner};
use crate::config::{is_usable_api_key, Config, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::conversation::{ConversationListener, ConversationStore};
use crate::error::Error;
use crate::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Builder for [`ChatSession`].
///
/// Keep this surface area small and predictable.
pub struct ChatSessionBuilder {
    backend: Option<Arc<dyn ChatBackend>>,
    api_key: Option<String>,
    request_timeout: Duration,
    store: Option<Arc<ConversationStore>>,
    listeners: Vec<Arc<dyn ConversationListener>>,
}

impl ChatSessionBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            store: None,
            listeners: Vec::new(),
        }
    }

    /// Builder wired to a [`GeminiClient`] for `config`.
    ///
    /// A missing API key is not an error here; each submission reports it in the
    /// conversation instead.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GeminiClient::from_config(config)?;
        let mut builder = Self::new()
            .backend(Arc::new(client))
            .request_timeout(config.request_timeout());
        builder.api_key = config.usable_api_key().map(String::from);
        Ok(builder)
    }

    pub fn backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Credential checked before every submission.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Bound on each backend call (default 30 s).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Use an existing store instead of a fresh empty one.
    pub fn store(mut self, store: Arc<ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn ConversationListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> Result<ChatSession> {
        let backend = self
            .backend
            .ok_or_else(|| Error::configuration("no chat backend configured"))?;
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout must be non-zero"));
        }

        let store = self.store.unwrap_or_default();
        for listener in self.listeners {
            store.subscribe(listener);
        }

        let has_credential = self.api_key.as_deref().map_or(false, is_usable_api_key);

        Ok(ChatSession::from_inner(SessionInner {
            store,
            backend,
            has_credential,
            request_timeout: self.request_timeout,
            queue: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }))
    }
}

impl Default for ChatSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
