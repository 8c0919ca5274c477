//! PostgreSQL conversation store

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, EmployeeId, HealthCheckResult, HealthCheckable, PortError};
use domain_assistant::{Conversation, ConversationPort};

use crate::adapters::ping;
use crate::repositories::ConversationRepository;

#[derive(Debug, Clone)]
pub struct PostgresConversationAdapter {
    repository: ConversationRepository,
    pool: PgPool,
}

impl PostgresConversationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ConversationRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresConversationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresConversationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-conversation-adapter").await
    }
}

#[async_trait]
impl ConversationPort for PostgresConversationAdapter {
    #[instrument(skip(self))]
    async fn find_active(&self, employee_id: EmployeeId) -> Result<Option<Conversation>, PortError> {
        Ok(self.repository.find_active(employee_id).await?.map(Conversation::from))
    }

    async fn insert(&self, conversation: &Conversation) -> Result<(), PortError> {
        Ok(self.repository.insert(conversation).await?)
    }

    #[instrument(skip(self, conversation), fields(conversation_id = %conversation.id))]
    async fn save(&self, conversation: &Conversation) -> Result<(), PortError> {
        Ok(self.repository.update(conversation).await?)
    }

    async fn end_active(&self, employee_id: EmployeeId) -> Result<u64, PortError> {
        Ok(self.repository.end_active(employee_id).await?)
    }
}
