//! # gemini-chat
//!
//! 面向 Gemini 的对话存储与消息发送编排。
//!
//! Conversation store and send orchestration for a chat front end backed by the
//! Google Gemini `generateContent` API.
//!
//! ## Overview
//!
//! The crate owns three small pieces of logic and delegates everything else
//! (inference, transport, authentication) to the hosted service:
//!
//! - **Conversation store**: an ordered list of role-tagged messages with
//!   append / remove-last mutations and listener notifications.
//! - **Send orchestration**: [`ChatSession::submit`] appends the user message and
//!   a placeholder, calls the backend under a bounded wait, then replaces the
//!   placeholder with the reply or a classified error.
//! - **Failure classification**: [`classify`] turns any [`Error`] into a
//!   human-readable message.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_chat::{ChatSessionBuilder, Config};
//!
//! #[tokio::main]
//! async fn main() -> gemini_chat::Result<()> {
//!     let config = Config::from_env()?;
//!     let session = ChatSessionBuilder::from_config(&config)?.build()?;
//!
//!     session.submit("Hello").wait().await;
//!
//!     for message in session.store().snapshot().iter() {
//!         println!("{:?}: {}", message.role, message.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Message and role types |
//! | [`conversation`] | Conversation store and listeners |
//! | [`client`] | Chat backend trait, Gemini client, session orchestration |
//! | [`drivers`] | Gemini request/response shaping |
//! | [`transport`] | HTTP transport and transport-level errors |
//! | [`error_code`] | User-facing failure categories |
//! | [`config`] | File and environment configuration |

pub mod client;
pub mod config;
pub mod conversation;
pub mod drivers;
pub mod error_code;
pub mod transport;
pub mod types;

pub use client::error_classification::{classify, classify_code};
pub use client::{
    ChatBackend, ChatReply, ChatSession, ChatSessionBuilder, GeminiClient, Outcome, Submission,
};
pub use config::Config;
pub use conversation::{
    ConversationListener, ConversationStore, EmptyStoreError, RecordingListener, Snapshot,
    StoreEvent,
};
pub use error_code::ChatErrorCode;
pub use types::message::{Message, Role, PLACEHOLDER_TEXT};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
