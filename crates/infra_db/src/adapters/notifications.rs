//! PostgreSQL notification store and role directory

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

use core_kernel::{DomainPort, EmployeeId, HealthCheckResult, HealthCheckable, NotificationId, PortError, SystemRole};
use domain_notifications::{Notification, NotificationPort, RoleDirectory};

use crate::adapters::ping;
use crate::error::DatabaseError;
use crate::repositories::{EmployeeRoleRepository, NotificationRepository};

#[derive(Debug, Clone)]
pub struct PostgresNotificationAdapter {
    repository: NotificationRepository,
    pool: PgPool,
}

impl PostgresNotificationAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: NotificationRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresNotificationAdapter {}

#[async_trait]
impl HealthCheckable for PostgresNotificationAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-notification-adapter").await
    }
}

#[async_trait]
impl NotificationPort for PostgresNotificationAdapter {
    #[instrument(skip(self, notification), fields(notification_id = %notification.id))]
    async fn insert(&self, notification: &Notification) -> Result<(), PortError> {
        self.repository.insert(notification).await?;
        debug!(recipients = notification.recipient_ids.len(), "Notification inserted");
        Ok(())
    }

    async fn get(&self, id: NotificationId) -> Result<Notification, PortError> {
        let row = self.repository.get(id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => PortError::not_found("Notification", id),
            other => other.into(),
        })?;
        Ok(Notification::try_from(row)?)
    }

    async fn for_recipient(&self, employee: EmployeeId) -> Result<Vec<Notification>, PortError> {
        let rows = self.repository.for_recipient(employee).await?;
        Ok(rows.into_iter().map(Notification::try_from).collect::<Result<Vec<_>, _>>()?)
    }

    async fn mark_read(&self, id: NotificationId, employee: EmployeeId) -> Result<(), PortError> {
        if !self.repository.mark_read(id, employee).await? {
            return Err(PortError::not_found("Notification", id));
        }
        Ok(())
    }

    async fn mark_all_read(&self, employee: EmployeeId) -> Result<u64, PortError> {
        Ok(self.repository.mark_all_read(employee).await?)
    }
}

/// Role lookups over the `employee_roles` table
#[derive(Debug, Clone)]
pub struct PostgresRoleDirectory {
    repository: EmployeeRoleRepository,
}

impl PostgresRoleDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: EmployeeRoleRepository::new(pool),
        }
    }

    pub fn repository(&self) -> &EmployeeRoleRepository {
        &self.repository
    }
}

impl DomainPort for PostgresRoleDirectory {}

#[async_trait]
impl RoleDirectory for PostgresRoleDirectory {
    async fn employees_with_role(&self, role: SystemRole) -> Result<Vec<EmployeeId>, PortError> {
        let ids = self.repository.holders_of(role).await?;
        Ok(ids.into_iter().map(EmployeeId::from_uuid).collect())
    }

    async fn roles_of(&self, employee: EmployeeId) -> Result<Vec<SystemRole>, PortError> {
        let names = self.repository.role_names(employee).await?;
        let mut roles = Vec::with_capacity(names.len());
        for name in names {
            match name.parse::<SystemRole>() {
                Ok(role) => roles.push(role),
                Err(_) => warn!(employee_id = %employee, role = %name, "Ignoring unknown stored role"),
            }
        }
        Ok(roles)
    }
}
