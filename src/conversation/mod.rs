//! 对话存储：按时间顺序保存消息，只支持追加与移除末尾元素。
//!
//! # Conversation Store
//!
//! An ordered, mutable list of [`Message`]s. The store carries no business logic
//! beyond append / remove-last; the placeholder invariants are upheld by
//! [`crate::client::ChatSession`], which is the only writer during a submission.
//!
//! Every mutation is published to registered [`ConversationListener`]s after the
//! internal lock has been released, so listeners may read the store freely.

pub mod listener;

pub use listener::{ConversationListener, RecordingListener, StoreEvent, TracingListener};

use crate::types::message::Message;
use std::ops::Deref;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Returned by [`ConversationStore::remove_last`] on an empty store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("conversation store is empty")]
pub struct EmptyStoreError;

/// Ordered conversation history, oldest first.
#[derive(Default)]
pub struct ConversationStore {
    messages: RwLock<Vec<Message>>,
    listeners: RwLock<Vec<Arc<dyn ConversationListener>>>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("messages", &*self.read())
            .field("listeners", &self.listeners_snapshot().len())
            .finish()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it sees every mutation made after this call.
    pub fn subscribe(&self, listener: Arc<dyn ConversationListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Append a message at the end of the conversation.
    pub fn append(&self, message: Message) {
        let index = {
            let mut messages = self.write();
            messages.push(message.clone());
            messages.len() - 1
        };
        self.notify(StoreEvent::Appended { index, message });
    }

    /// Remove and return the final message.
    pub fn remove_last(&self) -> Result<Message, EmptyStoreError> {
        let removed = self.write().pop().ok_or(EmptyStoreError)?;
        self.notify(StoreEvent::RemovedLast {
            message: removed.clone(),
        });
        Ok(removed)
    }

    /// Remove the final message only if it satisfies `predicate`.
    ///
    /// The check and the removal happen under one lock acquisition.
    pub fn remove_last_if<P>(&self, predicate: P) -> Option<Message>
    where
        P: FnOnce(&Message) -> bool,
    {
        let removed = {
            let mut messages = self.write();
            if messages.last().map_or(false, predicate) {
                messages.pop()
            } else {
                None
            }
        }?;
        self.notify(StoreEvent::RemovedLast {
            message: removed.clone(),
        });
        Some(removed)
    }

    /// Drop every message.
    pub fn clear(&self) {
        let had_messages = {
            let mut messages = self.write();
            let had = !messages.is_empty();
            messages.clear();
            had
        };
        if had_messages {
            self.notify(StoreEvent::Cleared);
        }
    }

    /// Read-only view of the conversation as it is right now.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.read().clone(),
        }
    }

    /// Ordered messages for which `exclude` returns false.
    pub fn history_excluding<P>(&self, exclude: P) -> Vec<Message>
    where
        P: Fn(&Message) -> bool,
    {
        self.read().iter().filter(|m| !exclude(*m)).cloned().collect()
    }

    pub fn last(&self) -> Option<Message> {
        self.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Message>> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Message>> {
        self.messages.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn listeners_snapshot(&self) -> Vec<Arc<dyn ConversationListener>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn notify(&self, event: StoreEvent) {
        for listener in self.listeners_snapshot() {
            listener.on_event(&event);
        }
    }
}

/// Point-in-time copy of the conversation, for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    messages: Vec<Message>,
}

impl Snapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn into_vec(self) -> Vec<Message> {
        self.messages
    }
}

impl Deref for Snapshot {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        &self.messages
    }
}

impl IntoIterator for Snapshot {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
