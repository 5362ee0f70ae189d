// Messaging domain models - conversations between marketplace members.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message stored in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: u64,
    pub conversation_id: u64,
    pub sender_id: u64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// A conversation and the members allowed to post in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: u64,
    pub participants: Vec<u64>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: u64) -> bool {
        self.participants.contains(&user_id)
    }
}

/// What happened to a message the user tried to send.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Stored in the conversation
    Delivered(ChatMessage),
    /// Blocked by the content filter; nothing was stored
    Rejected { reason: String },
}
