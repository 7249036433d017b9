//! Chat domain types
//!
//! Messages and users shared by the message list, the bubbles and the
//! host application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    /// Stable identifier, compared against the current user id
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional avatar reference (URL or glyph)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ChatUser {
    /// Create a user without an avatar
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
        }
    }

    /// Set the avatar
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// First character of the name, used when no avatar is set
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier
    pub id: Uuid,
    /// Sender
    pub user: ChatUser,
    /// Raw message text; may contain markdown and annotations
    pub message: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Whether delivery failed
    #[serde(default)]
    pub failed: bool,
}

impl ChatMessage {
    /// Create a new message stamped with the current time
    pub fn new(user: ChatUser, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            message: message.into(),
            timestamp: Utc::now(),
            failed: false,
        }
    }

    /// Whether the message was written by `user_id`
    pub fn is_from(&self, user_id: &str) -> bool {
        self.user.id == user_id
    }

    /// Merge a partial update into this message
    pub fn apply(&mut self, update: MessageUpdate) {
        if let Some(message) = update.message {
            self.message = message;
        }
        if let Some(user) = update.user {
            self.user = user;
        }
        if let Some(failed) = update.failed {
            self.failed = failed;
        }
    }
}

/// Partial update for a message; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageUpdate {
    pub message: Option<String>,
    pub user: Option<ChatUser>,
    pub failed: Option<bool>,
}

impl MessageUpdate {
    /// Update only the failed flag
    pub fn failed(failed: bool) -> Self {
        Self {
            failed: Some(failed),
            ..Self::default()
        }
    }

    /// Replace only the text
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}
