//! Conversation history and its port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ConversationId, DomainPort, EmployeeId, HealthCheckable, PortError};

use crate::llm::{ChatMessage, ChatRole};

/// Messages kept per conversation after each exchange
pub const HISTORY_LIMIT: usize = 20;

/// Messages replayed to the model as context
pub const CONTEXT_MESSAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(role: ChatRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            timestamp,
        }
    }
}

/// One employee's chat thread; at most one is active per employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub employee_id: EmployeeId,
    pub messages: Vec<StoredMessage>,
    pub summary: Option<String>,
    pub is_active: bool,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn start(employee_id: EmployeeId, now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::new_v7(),
            employee_id,
            messages: Vec::new(),
            summary: None,
            is_active: true,
            last_message_at: now,
            created_at: now,
        }
    }

    /// Last `limit` user/assistant messages, oldest first
    pub fn recent_context(&self, limit: usize) -> Vec<ChatMessage> {
        let visible: Vec<&StoredMessage> = self
            .messages
            .iter()
            .filter(|m| matches!(m.role, ChatRole::User | ChatRole::Assistant))
            .collect();
        let skip = visible.len().saturating_sub(limit);
        visible
            .into_iter()
            .skip(skip)
            .map(|m| match m.role {
                ChatRole::User => ChatMessage::user(m.content.clone()),
                _ => ChatMessage::assistant(m.content.clone()),
            })
            .collect()
    }

    pub fn push(&mut self, message: StoredMessage) {
        self.last_message_at = message.timestamp;
        self.messages.push(message);
    }

    /// Drops the oldest messages beyond `limit`
    pub fn trim_to(&mut self, limit: usize) {
        let excess = self.messages.len().saturating_sub(limit);
        if excess > 0 {
            self.messages.drain(..excess);
        }
    }
}

#[async_trait]
pub trait ConversationPort: DomainPort + HealthCheckable {
    async fn find_active(&self, employee_id: EmployeeId) -> Result<Option<Conversation>, PortError>;

    async fn insert(&self, conversation: &Conversation) -> Result<(), PortError>;

    /// Replaces messages and activity fields of an existing conversation
    async fn save(&self, conversation: &Conversation) -> Result<(), PortError>;

    /// Deactivates the employee's active conversations; returns how many
    async fn end_active(&self, employee_id: EmployeeId) -> Result<u64, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockConversationPort {
        conversations: Arc<RwLock<Vec<Conversation>>>,
    }

    impl MockConversationPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn all_for(&self, employee_id: EmployeeId) -> Vec<Conversation> {
            self.conversations
                .read()
                .await
                .iter()
                .filter(|c| c.employee_id == employee_id)
                .cloned()
                .collect()
        }
    }

    impl DomainPort for MockConversationPort {}

    #[async_trait]
    impl HealthCheckable for MockConversationPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-conversation-port")
        }
    }

    #[async_trait]
    impl ConversationPort for MockConversationPort {
        async fn find_active(&self, employee_id: EmployeeId) -> Result<Option<Conversation>, PortError> {
            Ok(self
                .conversations
                .read()
                .await
                .iter()
                .find(|c| c.employee_id == employee_id && c.is_active)
                .cloned())
        }

        async fn insert(&self, conversation: &Conversation) -> Result<(), PortError> {
            let mut conversations = self.conversations.write().await;
            if conversations.iter().any(|c| c.id == conversation.id) {
                return Err(PortError::conflict(format!("Conversation {} already exists", conversation.id)));
            }
            conversations.push(conversation.clone());
            Ok(())
        }

        async fn save(&self, conversation: &Conversation) -> Result<(), PortError> {
            let mut conversations = self.conversations.write().await;
            let existing = conversations
                .iter_mut()
                .find(|c| c.id == conversation.id)
                .ok_or_else(|| PortError::not_found("Conversation", conversation.id))?;
            *existing = conversation.clone();
            Ok(())
        }

        async fn end_active(&self, employee_id: EmployeeId) -> Result<u64, PortError> {
            let mut ended = 0;
            for conversation in self.conversations.write().await.iter_mut() {
                if conversation.employee_id == employee_id && conversation.is_active {
                    conversation.is_active = false;
                    ended += 1;
                }
            }
            Ok(ended)
        }
    }
}
