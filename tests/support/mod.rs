//! Scripted chat backend shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use gemini_chat::{ChatBackend, ChatReply, ConversationStore, Error, Message};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the backend does on its next call.
pub enum Step {
    Reply(String),
    Empty,
    Fail(Error),
    /// Reply after a delay.
    Delayed(Duration, String),
    /// Never answer within any sane bound.
    Hang,
}

impl Step {
    pub fn reply(text: &str) -> Self {
        Step::Reply(text.to_string())
    }
}

/// One observed call.
#[derive(Debug, Clone)]
pub struct Call {
    pub history: Vec<Message>,
    pub text: String,
    /// Whether the store's last entry was the placeholder while the call ran.
    pub placeholder_was_last: bool,
}

pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
    store: Arc<ConversationStore>,
}

impl ScriptedBackend {
    pub fn new(store: Arc<ConversationStore>, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
            store,
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn send(&self, history: &[Message], text: &str) -> gemini_chat::Result<ChatReply> {
        let placeholder_was_last = self
            .store
            .last()
            .map(|m| m.is_placeholder())
            .unwrap_or(false);
        self.calls.lock().unwrap().push(Call {
            history: history.to_vec(),
            text: text.to_string(),
            placeholder_was_last,
        });

        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("backend called more often than scripted");

        match step {
            Step::Reply(t) => Ok(ChatReply::text(t)),
            Step::Empty => Ok(ChatReply::empty()),
            Step::Fail(e) => Err(e),
            Step::Delayed(delay, t) => {
                tokio::time::sleep(delay).await;
                Ok(ChatReply::text(t))
            }
            Step::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Ok(ChatReply::text("far too late"))
            }
        }
    }
}
