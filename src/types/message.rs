//! Chat message format shared by the store, the orchestrator and the Gemini driver

use serde::{Deserialize, Serialize};

/// Text of the transient Model-role entry shown while a reply is pending.
pub const PLACEHOLDER_TEXT: &str = "Typing....";

/// A single conversation entry. Messages are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub role: Role,
    /// Set only on the in-flight sentinel; a reply carrying the same text is a
    /// normal message.
    #[serde(skip)]
    pending: bool,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role,
            pending: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// The "typing" sentinel appended while a backend call is in flight.
    pub fn placeholder() -> Self {
        Self {
            pending: true,
            ..Self::model(PLACEHOLDER_TEXT)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.pending
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Role name as used on the Gemini wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_model_sentinel() {
        let p = Message::placeholder();
        assert_eq!(p.role, Role::Model);
        assert!(p.is_placeholder());
        // Same text from the user is not the sentinel.
        assert!(!Message::user(PLACEHOLDER_TEXT).is_placeholder());
        assert!(!Message::model("Typing...").is_placeholder());
        // Nor is a model reply that happens to use the sentinel text.
        let echoed = Message::model(PLACEHOLDER_TEXT);
        assert!(!echoed.is_placeholder());
        assert_ne!(echoed, p);
    }

    #[test]
    fn pending_flag_is_not_serialized() {
        let json = serde_json::to_value(Message::placeholder()).unwrap();
        assert!(json.get("pending").is_none());
        let back: Message = serde_json::from_value(json).unwrap();
        assert!(!back.is_placeholder());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Message::model("hi")).unwrap();
        assert_eq!(json["role"], "model");
        assert_eq!(json["text"], "hi");
        assert_eq!(Role::User.as_str(), "user");
    }
}
