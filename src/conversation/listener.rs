//! Store observers.
//!
//! Rendering layers subscribe a [`ConversationListener`] instead of polling.
//! [`RecordingListener`] keeps events in memory (tests, embedding UIs) and
//! [`TracingListener`] logs them.

use crate::types::message::Message;
use std::sync::{PoisonError, RwLock};

/// A single store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Appended { index: usize, message: Message },
    RemovedLast { message: Message },
    Cleared,
}

/// Receives store mutations synchronously, after the store lock is released.
pub trait ConversationListener: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

/// In-memory event log.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: RwLock<Vec<StoreEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConversationListener for RecordingListener {
    fn on_event(&self, event: &StoreEvent) {
        self.events
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Logs every mutation at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl ConversationListener for TracingListener {
    fn on_event(&self, event: &StoreEvent) {
        match event {
            StoreEvent::Appended { index, message } => {
                tracing::debug!(index, role = message.role.as_str(), "message appended")
            }
            StoreEvent::RemovedLast { message } => {
                tracing::debug!(role = message.role.as_str(), "last message removed")
            }
            StoreEvent::Cleared => tracing::debug!("conversation cleared"),
        }
    }
}
