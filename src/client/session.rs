//! Send orchestration.
//!
//! A [`ChatSession`] turns one user utterance into store mutations:
//!
//! ```text
//! Idle -> UserMessageAppended -> PlaceholderAppended -> AwaitingResponse
//!      -> {Completed | TimedOut | Failed} -> Resolved
//! ```
//!
//! `Resolved` always leaves the store without the placeholder and with exactly
//! one new Model-role message (the reply or a classified error).
//!
//! Overlapping submissions are queued: each call takes its place in line
//! synchronously, before anything is spawned, and holds it for its whole run.
//! They resolve in call order and at most one placeholder exists.
//! Dropping the session cancels whatever is queued or in flight.

use crate::client::core::{ChatBackend, ChatReply};
use crate::client::error_classification::{classify, classify_code};
use crate::conversation::ConversationStore;
use crate::error::Error;
use crate::error_code::ChatErrorCode;
use crate::types::message::Message;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// How a single submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model replied with text.
    Completed,
    /// A Model-role error message was appended.
    Failed(ChatErrorCode),
    /// The session closed before the submission resolved; nothing was appended.
    Cancelled,
}

pub(crate) struct SessionInner {
    pub(crate) store: Arc<ConversationStore>,
    pub(crate) backend: Arc<dyn ChatBackend>,
    pub(crate) has_credential: bool,
    pub(crate) request_timeout: Duration,
    /// Completion signal of the most recently queued submission.
    pub(crate) queue: Mutex<Option<oneshot::Receiver<()>>>,
    pub(crate) shutdown: CancellationToken,
}

/// A place in the submission queue.
///
/// `ahead` resolves once the previous holder is dropped; dropping this ticket
/// releases the next one.
struct Ticket {
    ahead: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

/// One conversation plus the machinery to extend it.
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

/// Handle to a spawned submission.
///
/// Dropping it does not cancel the submission.
pub struct Submission {
    handle: JoinHandle<Outcome>,
}

impl Submission {
    /// Wait until the submission has resolved.
    pub async fn wait(self) -> Outcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "submission task did not complete");
                Outcome::Cancelled
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl ChatSession {
    pub(crate) fn from_inner(inner: SessionInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.inner.store
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    /// Start a submission in the background and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, text: impl Into<String>) -> Submission {
        let inner = Arc::clone(&self.inner);
        let ticket = inner.take_ticket();
        let text = text.into();
        Submission {
            handle: tokio::spawn(async move { inner.process(ticket, text).await }),
        }
    }

    /// Run a submission to completion on the current task.
    pub async fn send(&self, text: impl Into<String>) -> Outcome {
        let ticket = self.inner.take_ticket();
        self.inner.process(ticket, text.into()).await
    }

    /// Wait for pending submissions, then empty the conversation.
    pub async fn clear_history(&self) {
        let mut ticket = self.inner.take_ticket();
        wait_turn(ticket.ahead.take()).await;
        self.inner.store.clear();
        info!("conversation cleared");
    }

    /// Cancel queued and in-flight submissions. Later submissions do nothing.
    pub fn close(&self) {
        self.inner.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

async fn wait_turn(ahead: Option<oneshot::Receiver<()>>) {
    if let Some(ahead) = ahead {
        // The predecessor releases its turn by dropping its sender.
        let _ = ahead.await;
    }
}

impl SessionInner {
    fn take_ticket(&self) -> Ticket {
        let (done, next) = oneshot::channel();
        let ahead = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(next);
        Ticket { ahead, _done: done }
    }

    async fn process(&self, mut ticket: Ticket, text: String) -> Outcome {
        let span = info_span!("submission", id = %Uuid::new_v4());
        async move {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    debug!("session closed before submission started");
                    return Outcome::Cancelled;
                }
                _ = wait_turn(ticket.ahead.take()) => {}
            }
            let outcome = self.run(text).await;
            drop(ticket);
            outcome
        }
        .instrument(span)
        .await
    }

    /// Steps of one submission; the caller holds its turn.
    async fn run(&self, text: String) -> Outcome {
        if !self.has_credential {
            warn!("no usable API key; skipping request");
            self.store
                .append(Message::model(ChatErrorCode::Configuration.user_message()));
            return Outcome::Failed(ChatErrorCode::Configuration);
        }

        // Context is everything before this turn; the new text travels separately.
        let history = self.store.history_excluding(Message::is_placeholder);

        self.store.append(Message::user(text.clone()));
        self.store.append(Message::placeholder());

        info!(history_len = history.len(), "awaiting model reply");
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(Error::Cancelled),
            r = tokio::time::timeout(self.request_timeout, self.backend.send(&history, &text)) => {
                match r {
                    Ok(r) => r,
                    Err(_) => Err(Error::Timeout { after: self.request_timeout }),
                }
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(ChatReply { text: Some(reply), .. }) if !reply.trim().is_empty() => {
                self.retire_placeholder();
                self.store.append(Message::model(reply));
                info!(elapsed_ms, "reply received");
                Outcome::Completed
            }
            Ok(reply) => {
                self.retire_placeholder();
                self.store
                    .append(Message::model(ChatErrorCode::EmptyResponse.user_message()));
                warn!(elapsed_ms, finish_reason = ?reply.finish_reason, "empty reply");
                Outcome::Failed(ChatErrorCode::EmptyResponse)
            }
            Err(Error::Cancelled) => {
                self.retire_placeholder();
                debug!(elapsed_ms, "submission abandoned on session close");
                Outcome::Cancelled
            }
            Err(e) => {
                self.retire_placeholder();
                let code = classify_code(&e);
                warn!(elapsed_ms, error = %e, code = code.code(), "chat request failed");
                self.store.append(Message::model(classify(&e)));
                Outcome::Failed(code)
            }
        }
    }

    /// Remove the placeholder only if it is still the last entry.
    fn retire_placeholder(&self) {
        if self
            .store
            .remove_last_if(Message::is_placeholder)
            .is_none()
        {
            warn!("placeholder already gone; leaving store untouched");
        }
    }
}
