// Messaging service - the inbox behind the message composer.
//
// Every outgoing message is screened by the moderation service first.
// A rejected message never reaches the conversation store.

use super::messaging_models::{ChatMessage, Conversation, SendOutcome};
use crate::core::moderation::{BlockedAttemptStore, ModerationService};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Conversation {0} not found")]
    ConversationNotFound(u64),

    #[error("User {user_id} is not part of conversation {conversation_id}")]
    NotAParticipant { user_id: u64, conversation_id: u64 },

    #[error("A conversation needs at least two participants")]
    NotEnoughParticipants,

    #[allow(dead_code)]
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create a conversation and return its id.
    async fn create_conversation(&self, participants: Vec<u64>) -> Result<u64, MessagingError>;

    async fn get_conversation(
        &self,
        conversation_id: u64,
    ) -> Result<Option<Conversation>, MessagingError>;

    /// Append a message; the store assigns the id and timestamp.
    async fn append_message(
        &self,
        conversation_id: u64,
        sender_id: u64,
        content: String,
    ) -> Result<ChatMessage, MessagingError>;

    /// Ids of every conversation the user takes part in.
    async fn conversations_for(&self, user_id: u64) -> Result<Vec<u64>, MessagingError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct MessagingService<C: ConversationStore, S: BlockedAttemptStore> {
    conversations: C,
    moderation: Arc<ModerationService<S>>,
}

impl<C: ConversationStore, S: BlockedAttemptStore> MessagingService<C, S> {
    pub fn new(conversations: C, moderation: Arc<ModerationService<S>>) -> Self {
        Self {
            conversations,
            moderation,
        }
    }

    /// Start a conversation between the given members.
    pub async fn open_conversation(&self, participants: Vec<u64>) -> Result<u64, MessagingError> {
        let mut participants = participants;
        participants.sort_unstable();
        participants.dedup();

        if participants.len() < 2 {
            return Err(MessagingError::NotEnoughParticipants);
        }

        let conversation_id = self.conversations.create_conversation(participants).await?;
        tracing::info!(conversation_id, "Opened conversation");
        Ok(conversation_id)
    }

    /// Screen and, if allowed, store a message.
    pub async fn send_message(
        &self,
        conversation_id: u64,
        sender_id: u64,
        content: &str,
    ) -> Result<SendOutcome, MessagingError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MessagingError::EmptyMessage);
        }

        let conversation = self
            .conversations
            .get_conversation(conversation_id)
            .await?
            .ok_or(MessagingError::ConversationNotFound(conversation_id))?;

        if !conversation.has_participant(sender_id) {
            return Err(MessagingError::NotAParticipant {
                user_id: sender_id,
                conversation_id,
            });
        }

        let verdict = self
            .moderation
            .screen(sender_id, conversation_id, content)
            .await;

        if verdict.is_restricted {
            return Ok(SendOutcome::Rejected {
                reason: verdict.reason,
            });
        }

        let message = self
            .conversations
            .append_message(conversation_id, sender_id, content.to_string())
            .await?;

        tracing::debug!(
            conversation_id,
            sender_id,
            message_id = message.message_id,
            "Message delivered"
        );
        Ok(SendOutcome::Delivered(message))
    }

    /// Messages of a conversation, oldest first.
    pub async fn history(&self, conversation_id: u64) -> Result<Vec<ChatMessage>, MessagingError> {
        self.conversations
            .get_conversation(conversation_id)
            .await?
            .map(|c| c.messages)
            .ok_or(MessagingError::ConversationNotFound(conversation_id))
    }

    pub async fn conversations_for(&self, user_id: u64) -> Result<Vec<u64>, MessagingError> {
        self.conversations.conversations_for(user_id).await
    }

    pub fn moderation(&self) -> &ModerationService<S> {
        &self.moderation
    }
}

// ============================================================================
// TESTS
// ============================================================================
