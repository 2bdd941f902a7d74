//! Chat messages - the conversational record attached to a case

use crate::ids::{CaseId, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// A human on the legal team
    User,
    /// The AI assistant
    Assistant,
}

impl MessageRole {
    /// Canonical lowercase string form, as stored and serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Parse the canonical string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a case's chat history
///
/// Append-only; readers order by timestamp ascending. `is_analysis` marks
/// assistant messages that summarize a document analysis, as opposed to
/// plain conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique identifier
    pub id: MessageId,

    /// Case this message belongs to
    pub case_id: CaseId,

    /// Author role
    pub role: MessageRole,

    /// Message text
    pub content: String,

    /// True for assistant messages carrying an analysis summary
    pub is_analysis: bool,

    /// When the message was appended
    pub created_at: DateTime<Utc>,
}
