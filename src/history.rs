//! Conversation history model
//!
//! The caller owns persistence; the router only ever reads a history and
//! derives provider input from it. Two shaping rules live here because both
//! provider classes need them:
//!
//! - Turn-based providers get [`ConversationHistory::turn_based_view`]:
//!   blank messages removed, everything before the first user message
//!   dropped, final message split off as the new input.
//! - Flat chat-completion providers get the history unchanged.

use serde::{Deserialize, Deserializer, Serialize};

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Lenient parse: only `"user"` is a user turn, anything else is the assistant
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("user") {
            Role::User
        } else {
            Role::Assistant
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Role::from_label(&label))
    }
}

/// A single message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds, display/ordering only
    #[serde(default)]
    pub timestamp: i64,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, 0)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, 0)
    }

    /// Whether the message has any non-whitespace content
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Chronologically ordered messages of one conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<ConversationMessage>,
}

/// Turn-based input derived from a history
///
/// `history` always starts with a user message and contains no blank
/// messages; `input` is the content of the final eligible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnBasedView<'a> {
    pub history: Vec<&'a ConversationMessage>,
    pub input: &'a str,
}

impl ConversationHistory {
    pub fn new(messages: Vec<ConversationMessage>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Return a copy with `message` appended as a new user turn
    ///
    /// A missing or whitespace-only message leaves the history unchanged.
    pub fn with_user_message(&self, message: Option<&str>, timestamp: i64) -> Self {
        let mut messages = self.messages.clone();
        if let Some(text) = message.filter(|m| !m.trim().is_empty()) {
            messages.push(ConversationMessage::new(Role::User, text, timestamp));
        }
        Self { messages }
    }

    /// Shape the history for providers that require user-first turns
    ///
    /// Returns `None` when no non-blank user message exists.
    pub fn turn_based_view(&self) -> Option<TurnBasedView<'_>> {
        let eligible: Vec<&ConversationMessage> =
            self.messages.iter().filter(|m| m.has_content()).collect();

        let first_user = eligible.iter().position(|m| m.role == Role::User)?;
        let mut turns: Vec<&ConversationMessage> = eligible.into_iter().skip(first_user).collect();

        let last = turns.pop()?;
        Some(TurnBasedView {
            history: turns,
            input: last.content.as_str(),
        })
    }
}

impl From<Vec<ConversationMessage>> for ConversationHistory {
    fn from(messages: Vec<ConversationMessage>) -> Self {
        Self::new(messages)
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a ConversationMessage;
    type IntoIter = std::slice::Iter<'a, ConversationMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
