//! Chat transcript types for Heavy Lifter.
//!
//! A transcript is the ordered list of user/assistant turns shown on a chat
//! page. It lives for the duration of an interactive session and is discarded
//! when the process exits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::TranscriptError;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Which chat page a session belongs to.
///
/// Each page runs a different chain over the same database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPage {
    /// Natural-language questions answered from the database.
    Lifter,
    /// GraphQL queries translated to SQL against the configured schema.
    Graphql,
}

impl ChatPage {
    pub fn title(&self) -> &'static str {
        match self {
            ChatPage::Lifter => "Heavy Lifter",
            ChatPage::Graphql => "GraphQLifter",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ChatPage::Lifter => "/lifter",
            ChatPage::Graphql => "/graphql",
        }
    }
}

impl fmt::Display for ChatPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatPage::Lifter => write!(f, "lifter"),
            ChatPage::Graphql => write!(f, "graphql"),
        }
    }
}

impl FromStr for ChatPage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lifter" => Ok(ChatPage::Lifter),
            "graphql" => Ok(ChatPage::Graphql),
            other => Err(format!("unknown chat page: '{other}'")),
        }
    }
}

/// A single turn in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// An ordered, role-alternating sequence of chat turns.
///
/// Turns are append-only and must alternate `user`, `assistant`, `user`, ...
/// starting with `user`. System turns never appear in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Uuid,
    pub page: ChatPage,
    pub started_at: DateTime<Utc>,
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new(page: ChatPage) -> Self {
        Self {
            id: Uuid::now_v7(),
            page,
            started_at: Utc::now(),
            turns: Vec::new(),
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The role the next appended turn must have.
    pub fn expected_role(&self) -> MessageRole {
        match self.turns.last().map(|t| t.role) {
            Some(MessageRole::User) => MessageRole::Assistant,
            _ => MessageRole::User,
        }
    }

    /// Append a single turn, enforcing role alternation.
    pub fn push(&mut self, turn: ChatTurn) -> Result<(), TranscriptError> {
        let expected = self.expected_role();
        if turn.role != expected {
            return Err(TranscriptError::OutOfTurn {
                expected: expected.to_string(),
                actual: turn.role.to_string(),
            });
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Append a user turn and its assistant reply together.
    ///
    /// Either both turns are appended or neither is.
    pub fn record_exchange(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<(), TranscriptError> {
        if self.expected_role() != MessageRole::User {
            return Err(TranscriptError::OutOfTurn {
                expected: self.expected_role().to_string(),
                actual: MessageRole::User.to_string(),
            });
        }
        self.turns.push(ChatTurn::new(MessageRole::User, user));
        self.turns.push(ChatTurn::new(MessageRole::Assistant, assistant));
        Ok(())
    }

    /// Drop all turns, keeping the session identity.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
