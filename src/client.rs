//! Chat client: backend contract, Gemini implementation and send orchestration.
//!
//! Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod error_classification;
pub mod session;

pub use builder::ChatSessionBuilder;
pub use core::{ChatBackend, ChatReply, GeminiClient};
pub use session::{ChatSession, Outcome, Submission};
