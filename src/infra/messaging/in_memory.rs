// In-memory implementation of ConversationStore.
//
// Conversations live in a DashMap so concurrent sends into different
// conversations never wait on each other. Nothing is persisted.

use crate::core::messaging::{ChatMessage, Conversation, ConversationStore, MessagingError};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct InMemoryConversationStore {
    conversations: DashMap<u64, Conversation>,
    next_conversation_id: AtomicU64,
    next_message_id: AtomicU64,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self {
            conversations: DashMap::new(),
            next_conversation_id: AtomicU64::new(1),
            next_message_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create_conversation(&self, participants: Vec<u64>) -> Result<u64, MessagingError> {
        let conversation_id = self.next_conversation_id.fetch_add(1, Ordering::Relaxed);

        self.conversations.insert(
            conversation_id,
            Conversation {
                conversation_id,
                participants,
                messages: Vec::new(),
                created_at: Utc::now(),
            },
        );

        Ok(conversation_id)
    }

    async fn get_conversation(
        &self,
        conversation_id: u64,
    ) -> Result<Option<Conversation>, MessagingError> {
        Ok(self
            .conversations
            .get(&conversation_id)
            .map(|entry| entry.clone()))
    }

    async fn append_message(
        &self,
        conversation_id: u64,
        sender_id: u64,
        content: String,
    ) -> Result<ChatMessage, MessagingError> {
        // get_mut holds the shard lock, so id assignment and push are atomic
        // with respect to other sends into this conversation.
        let mut conversation = self
            .conversations
            .get_mut(&conversation_id)
            .ok_or(MessagingError::ConversationNotFound(conversation_id))?;

        let message = ChatMessage {
            message_id: self.next_message_id.fetch_add(1, Ordering::Relaxed),
            conversation_id,
            sender_id,
            content,
            sent_at: Utc::now(),
        };
        conversation.messages.push(message.clone());

        Ok(message)
    }

    async fn conversations_for(&self, user_id: u64) -> Result<Vec<u64>, MessagingError> {
        let mut ids: Vec<u64> = self
            .conversations
            .iter()
            .filter(|entry| entry.value().has_participant(user_id))
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
