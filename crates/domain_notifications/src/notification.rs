//! Notification entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{EmployeeId, NotificationId};

/// Module tag stored on every payroll notification
pub const PAYROLL_MODULE: &str = "Payroll";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Alert,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Info => "info",
            NotificationType::Success => "success",
            NotificationType::Warning => "warning",
            NotificationType::Alert => "alert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "info" => Some(NotificationType::Info),
            "success" => Some(NotificationType::Success),
            "warning" => Some(NotificationType::Warning),
            "alert" => Some(NotificationType::Alert),
            _ => None,
        }
    }
}

/// Broadcasts reach every employee regardless of `recipient_ids`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    Direct,
    Broadcast,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Direct => "direct",
            DeliveryType::Broadcast => "broadcast",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "direct" => Some(DeliveryType::Direct),
            "broadcast" => Some(DeliveryType::Broadcast),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_ids: Vec<EmployeeId>,
    pub delivery: DeliveryType,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_module: String,
    /// Database id of the claim, dispute, or refund this is about
    pub related_entity_id: Option<Uuid>,
    pub read_by: Vec<EmployeeId>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// A payroll notification addressed to specific employees
    pub fn direct(
        recipient_ids: Vec<EmployeeId>,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            id: NotificationId::new_v7(),
            recipient_ids,
            delivery: DeliveryType::Direct,
            title: title.into(),
            message: message.into(),
            notification_type,
            related_module: PAYROLL_MODULE.to_string(),
            related_entity_id: None,
            read_by: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn broadcast(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            delivery: DeliveryType::Broadcast,
            ..Self::direct(Vec::new(), title, message, NotificationType::Info)
        }
    }

    pub fn about(mut self, entity_id: Uuid) -> Self {
        self.related_entity_id = Some(entity_id);
        self
    }

    pub fn is_addressed_to(&self, employee: EmployeeId) -> bool {
        self.delivery == DeliveryType::Broadcast || self.recipient_ids.contains(&employee)
    }

    pub fn is_read_by(&self, employee: EmployeeId) -> bool {
        self.read_by.contains(&employee)
    }

    /// Set semantics; returns false when already marked
    pub fn mark_read_by(&mut self, employee: EmployeeId) -> bool {
        if self.is_read_by(employee) {
            return false;
        }
        self.read_by.push(employee);
        true
    }

    pub fn view_for(self, employee: EmployeeId) -> NotificationView {
        let is_read = self.is_read_by(employee);
        NotificationView {
            notification: self,
            is_read,
        }
    }
}

/// A notification as seen by one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub notification: Notification,
    pub is_read: bool,
}
