//! Chat message data model.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person using the widget.
    User,
    /// Text produced by the assistant or by the widget itself.
    Bot,
}

impl Role {
    /// Label shown in the avatar next to the bubble.
    #[must_use]
    pub fn avatar_label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Bot => "FB",
        }
    }

    /// CSS class shared by the avatar and bubble elements.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// One rendered chat turn.
///
/// Messages are immutable once appended to a view; the only way to get rid of
/// them is clearing the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message author.
    pub role: Role,
    /// Raw (unescaped) text.
    pub text: String,
    /// Optional caption rendered below the bubble.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            meta: None,
        }
    }

    /// Create a bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
            meta: None,
        }
    }

    /// Attach a caption. Empty captions are dropped.
    #[must_use]
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        let meta = meta.into();
        self.meta = (!meta.is_empty()).then_some(meta);
        self
    }
}
