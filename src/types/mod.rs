//! 类型模块：对话消息与角色。
//!
//! # Types Module
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Immutable chat entry with text and role |
//! | [`Role`] | Message author (user or model) |

pub mod message;

pub use message::{Message, Role, PLACEHOLDER_TEXT};
