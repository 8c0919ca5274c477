//! Conversation table

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{ConversationId, EmployeeId};
use domain_assistant::{Conversation, StoredMessage};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub messages: Json<Vec<StoredMessage>>,
    pub summary: Option<String>,
    pub is_active: bool,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: ConversationId::from_uuid(row.id),
            employee_id: EmployeeId::from_uuid(row.employee_id),
            messages: row.messages.0,
            summary: row.summary,
            is_active: row.is_active,
            last_message_at: row.last_message_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active(&self, employee: EmployeeId) -> Result<Option<ConversationRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, employee_id, messages, summary, is_active, last_message_at, created_at
            FROM conversations
            WHERE employee_id = $1 AND is_active
            ORDER BY last_message_at DESC
            LIMIT 1
            "#,
        )
        .bind(*employee.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert(&self, conversation: &Conversation) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, employee_id, messages, summary, is_active, last_message_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*conversation.id.as_uuid())
        .bind(*conversation.employee_id.as_uuid())
        .bind(Json(&conversation.messages))
        .bind(&conversation.summary)
        .bind(conversation.is_active)
        .bind(conversation.last_message_at)
        .bind(conversation.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, conversation: &Conversation) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE conversations
            SET messages = $2, summary = $3, is_active = $4, last_message_at = $5
            WHERE id = $1
            "#,
        )
        .bind(*conversation.id.as_uuid())
        .bind(Json(&conversation.messages))
        .bind(&conversation.summary)
        .bind(conversation.is_active)
        .bind(conversation.last_message_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Conversation", conversation.id));
        }
        Ok(())
    }

    pub async fn end_active(&self, employee: EmployeeId) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE conversations SET is_active = FALSE WHERE employee_id = $1 AND is_active")
            .bind(*employee.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
