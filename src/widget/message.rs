//! Chat message data model.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed and submitted by the user.
    User,
    /// Produced by the response provider.
    Assistant,
}

impl Origin {
    /// CSS class applied to the bubble wrapper.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Assistant => "ai-message",
        }
    }
}

/// A single entry in the chat history.
///
/// Messages are immutable once created and are never removed from a widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    text: String,
    origin: Origin,
}

impl Message {
    /// Create a user-authored message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
        }
    }

    /// Create an assistant-authored message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Assistant,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_origin() {
        assert_eq!(Message::user("a").origin(), Origin::User);
        assert_eq!(Message::assistant("b").origin(), Origin::Assistant);
        assert_eq!(Message::user("hello").text(), "hello");
    }

    #[test]
    fn test_origin_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("ok")).unwrap();
        assert!(json.contains("\"origin\":\"assistant\""));
    }
}
