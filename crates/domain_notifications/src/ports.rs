//! Notification ports

use async_trait::async_trait;

use core_kernel::{DomainPort, EmployeeId, HealthCheckable, NotificationId, PortError, SystemRole};

use crate::notification::Notification;

#[async_trait]
pub trait NotificationPort: DomainPort + HealthCheckable {
    async fn insert(&self, notification: &Notification) -> Result<(), PortError>;

    /// Fails with `PortError::NotFound` when absent
    async fn get(&self, id: NotificationId) -> Result<Notification, PortError>;

    /// Direct and broadcast notifications for the employee, newest first
    async fn for_recipient(&self, employee: EmployeeId) -> Result<Vec<Notification>, PortError>;

    /// Adds the employee to `read_by`; no-op when already present
    async fn mark_read(&self, id: NotificationId, employee: EmployeeId) -> Result<(), PortError>;

    /// Marks everything addressed to the employee; returns how many changed
    async fn mark_all_read(&self, employee: EmployeeId) -> Result<u64, PortError>;
}

/// Lookup of active employees by system role
#[async_trait]
pub trait RoleDirectory: DomainPort {
    async fn employees_with_role(&self, role: SystemRole) -> Result<Vec<EmployeeId>, PortError>;

    async fn roles_of(&self, employee: EmployeeId) -> Result<Vec<SystemRole>, PortError>;
}

#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockNotificationPort {
        notifications: Arc<RwLock<Vec<Notification>>>,
    }

    impl MockNotificationPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn all(&self) -> Vec<Notification> {
            self.notifications.read().await.clone()
        }
    }

    impl DomainPort for MockNotificationPort {}

    #[async_trait]
    impl HealthCheckable for MockNotificationPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-notification-port")
        }
    }

    #[async_trait]
    impl NotificationPort for MockNotificationPort {
        async fn insert(&self, notification: &Notification) -> Result<(), PortError> {
            self.notifications.write().await.push(notification.clone());
            Ok(())
        }

        async fn get(&self, id: NotificationId) -> Result<Notification, PortError> {
            self.notifications
                .read()
                .await
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Notification", id))
        }

        async fn for_recipient(&self, employee: EmployeeId) -> Result<Vec<Notification>, PortError> {
            let mut found: Vec<Notification> = self
                .notifications
                .read()
                .await
                .iter()
                .filter(|n| n.is_addressed_to(employee))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(found)
        }

        async fn mark_read(&self, id: NotificationId, employee: EmployeeId) -> Result<(), PortError> {
            let mut notifications = self.notifications.write().await;
            let notification = notifications
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| PortError::not_found("Notification", id))?;
            notification.mark_read_by(employee);
            Ok(())
        }

        async fn mark_all_read(&self, employee: EmployeeId) -> Result<u64, PortError> {
            let mut changed = 0;
            for notification in self.notifications.write().await.iter_mut() {
                if notification.is_addressed_to(employee) && notification.mark_read_by(employee) {
                    changed += 1;
                }
            }
            Ok(changed)
        }
    }

    /// Fixed role assignments
    #[derive(Debug, Default)]
    pub struct MockRoleDirectory {
        roles: Arc<RwLock<HashMap<EmployeeId, Vec<SystemRole>>>>,
    }

    impl MockRoleDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn assign(&self, employee: EmployeeId, role: SystemRole) {
            self.roles.write().await.entry(employee).or_default().push(role);
        }
    }

    impl DomainPort for MockRoleDirectory {}

    #[async_trait]
    impl RoleDirectory for MockRoleDirectory {
        async fn employees_with_role(&self, role: SystemRole) -> Result<Vec<EmployeeId>, PortError> {
            let mut employees: Vec<EmployeeId> = self
                .roles
                .read()
                .await
                .iter()
                .filter(|(_, roles)| roles.contains(&role))
                .map(|(id, _)| *id)
                .collect();
            employees.sort();
            Ok(employees)
        }

        async fn roles_of(&self, employee: EmployeeId) -> Result<Vec<SystemRole>, PortError> {
            Ok(self.roles.read().await.get(&employee).cloned().unwrap_or_default())
        }
    }
}
