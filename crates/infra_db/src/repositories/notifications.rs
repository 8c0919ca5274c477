//! Notification and employee-role tables

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{EmployeeId, NotificationId, SystemRole};
use domain_notifications::{DeliveryType, Notification, NotificationType};

use crate::error::DatabaseError;

const NOTIFICATION_COLUMNS: &str = "id, recipient_ids, delivery, title, message, notification_type, \
     related_module, related_entity_id, read_by, created_at";

/// Rows a given employee can see
const ADDRESSED_TO: &str = "(delivery = 'broadcast' OR $1 = ANY(recipient_ids))";

#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub recipient_ids: Vec<Uuid>,
    pub delivery: String,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub related_module: String,
    pub related_entity_id: Option<Uuid>,
    pub read_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = DatabaseError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let delivery =
            DeliveryType::parse(&row.delivery).ok_or_else(|| DatabaseError::corrupt("delivery", &row.delivery))?;
        let notification_type = NotificationType::parse(&row.notification_type)
            .ok_or_else(|| DatabaseError::corrupt("notification_type", &row.notification_type))?;
        Ok(Notification {
            id: NotificationId::from_uuid(row.id),
            recipient_ids: row.recipient_ids.into_iter().map(EmployeeId::from_uuid).collect(),
            delivery,
            title: row.title,
            message: row.message,
            notification_type,
            related_module: row.related_module,
            related_entity_id: row.related_entity_id,
            read_by: row.read_by.into_iter().map(EmployeeId::from_uuid).collect(),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, notification: &Notification) -> Result<(), DatabaseError> {
        let recipients: Vec<Uuid> = notification.recipient_ids.iter().map(|id| Uuid::from(*id)).collect();
        let read_by: Vec<Uuid> = notification.read_by.iter().map(|id| Uuid::from(*id)).collect();
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, recipient_ids, delivery, title, message, notification_type,
                related_module, related_entity_id, read_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*notification.id.as_uuid())
        .bind(recipients)
        .bind(notification.delivery.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(&notification.related_module)
        .bind(notification.related_entity_id)
        .bind(read_by)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, id: NotificationId) -> Result<NotificationRow, DatabaseError> {
        let sql = format!("SELECT {} FROM notifications WHERE id = $1", NOTIFICATION_COLUMNS);
        sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Notification", id))
    }

    pub async fn for_recipient(&self, employee: EmployeeId) -> Result<Vec<NotificationRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM notifications WHERE {} ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS, ADDRESSED_TO
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(*employee.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns false when the notification does not exist
    pub async fn mark_read(&self, id: NotificationId, employee: EmployeeId) -> Result<bool, DatabaseError> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            WITH target AS (SELECT id FROM notifications WHERE id = $1),
            updated AS (
                UPDATE notifications SET read_by = array_append(read_by, $2)
                WHERE id = $1 AND NOT ($2 = ANY(read_by))
            )
            SELECT EXISTS(SELECT 1 FROM target)
            "#,
        )
        .bind(*id.as_uuid())
        .bind(*employee.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    pub async fn mark_all_read(&self, employee: EmployeeId) -> Result<u64, DatabaseError> {
        let sql = format!(
            "UPDATE notifications SET read_by = array_append(read_by, $1) \
             WHERE {} AND NOT ($1 = ANY(read_by))",
            ADDRESSED_TO
        );
        let result = sqlx::query(&sql).bind(*employee.as_uuid()).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Repository for the `employee_roles` table
#[derive(Debug, Clone)]
pub struct EmployeeRoleRepository {
    pool: PgPool,
}

impl EmployeeRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grants or reactivates a role
    pub async fn assign(&self, employee: EmployeeId, role: SystemRole) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO employee_roles (employee_id, role, is_active)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (employee_id, role) DO UPDATE SET is_active = TRUE
            "#,
        )
        .bind(*employee.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn deactivate(&self, employee: EmployeeId, role: SystemRole) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE employee_roles SET is_active = FALSE WHERE employee_id = $1 AND role = $2")
            .bind(*employee.as_uuid())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn holders_of(&self, role: SystemRole) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT employee_id FROM employee_roles WHERE role = $1 AND is_active ORDER BY assigned_at",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn role_names(&self, employee: EmployeeId) -> Result<Vec<String>, DatabaseError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT role FROM employee_roles WHERE employee_id = $1 AND is_active ORDER BY role",
        )
        .bind(*employee.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }
}
