//! Notification service
//!
//! Writes review notifications and serves per-recipient inboxes. Role
//! recipients (payroll managers, finance staff) are resolved at send time,
//! so a notice reaches whoever holds the role when it is sent.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use core_kernel::{EmployeeId, NotificationId, PortError, SystemRole};
use domain_claims::{CaseKind, ReviewEventKind, ReviewNotice, ReviewNotifier};

use crate::error::NotificationError;
use crate::notification::{DeliveryType, Notification, NotificationType, NotificationView, PAYROLL_MODULE};
use crate::ports::{NotificationPort, RoleDirectory};

/// Title of the notice finance staff receive for every approved claim
pub const REFUND_REQUIRED_TITLE: &str = "Expense Claim Approved - Refund Required";

fn subject_title(kind: CaseKind) -> &'static str {
    match kind {
        CaseKind::Claim => "Expense Claim",
        CaseKind::Dispute => "Payslip Dispute",
    }
}

fn subject_noun(kind: CaseKind) -> &'static str {
    match kind {
        CaseKind::Claim => "expense claim",
        CaseKind::Dispute => "payslip dispute",
    }
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationPort>,
    directory: Arc<dyn RoleDirectory>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationPort>, directory: Arc<dyn RoleDirectory>) -> Self {
        Self { store, directory }
    }

    /// Stores a notification for explicit recipients
    pub async fn send(&self, notification: Notification) -> Result<Notification, NotificationError> {
        if notification.recipient_ids.is_empty() && notification.delivery != DeliveryType::Broadcast {
            return Err(NotificationError::NoRecipients);
        }
        self.store.insert(&notification).await?;
        debug!(id = %notification.id, title = %notification.title, "Notification stored");
        Ok(notification)
    }

    async fn send_to_role(
        &self,
        role: SystemRole,
        notification: impl FnOnce(Vec<EmployeeId>) -> Notification,
    ) -> Result<(), NotificationError> {
        let recipients = self.directory.employees_with_role(role).await?;
        if recipients.is_empty() {
            warn!(role = %role, "No active employees hold the role; notification skipped");
            return Ok(());
        }
        self.send(notification(recipients)).await?;
        Ok(())
    }

    /// Inbox for one employee, newest first, with their read flag
    #[instrument(skip(self))]
    pub async fn notifications_for(&self, employee: EmployeeId) -> Result<Vec<NotificationView>, NotificationError> {
        let notifications = self.store.for_recipient(employee).await?;
        Ok(notifications.into_iter().map(|n| n.view_for(employee)).collect())
    }

    /// Marks one notification read; only its recipients may do so
    #[instrument(skip(self))]
    pub async fn mark_as_read(
        &self,
        id: NotificationId,
        employee: EmployeeId,
    ) -> Result<NotificationView, NotificationError> {
        let notification = self.store.get(id).await.map_err(|e| match e {
            PortError::NotFound { .. } => NotificationError::NotFound(id),
            other => NotificationError::Port(other),
        })?;
        if !notification.is_addressed_to(employee) {
            return Err(NotificationError::NotFound(id));
        }

        self.store.mark_read(id, employee).await?;
        let mut notification = notification;
        notification.mark_read_by(employee);
        Ok(notification.view_for(employee))
    }

    #[instrument(skip(self))]
    pub async fn mark_all_as_read(&self, employee: EmployeeId) -> Result<u64, NotificationError> {
        Ok(self.store.mark_all_read(employee).await?)
    }

    /// Unread refund requests addressed to a finance staff member
    pub async fn unread_refund_requests(&self, finance_staff: EmployeeId) -> Result<Vec<Notification>, NotificationError> {
        let notifications = self.store.for_recipient(finance_staff).await?;
        Ok(notifications
            .into_iter()
            .filter(|n| {
                n.related_module == PAYROLL_MODULE
                    && n.title == REFUND_REQUIRED_TITLE
                    && !n.is_read_by(finance_staff)
            })
            .collect())
    }
}

fn employee_notification(notice: &ReviewNotice) -> Notification {
    let title = subject_title(notice.subject);
    let noun = subject_noun(notice.subject);
    let number = &notice.subject_number;

    let (heading, message, kind) = match notice.event {
        ReviewEventKind::UnderReview => (
            format!("{} Under Review", title),
            format!(
                "Your {} {} has been approved by a Payroll Specialist and is awaiting manager confirmation.",
                noun, number
            ),
            NotificationType::Info,
        ),
        ReviewEventKind::Rejected => (
            format!("{} Rejected", title),
            format!("Your {} {} has been rejected.", noun, number),
            NotificationType::Warning,
        ),
        ReviewEventKind::Approved => (
            format!("{} Approved", title),
            format!("Your {} {} has been approved. A refund will be processed.", noun, number),
            NotificationType::Success,
        ),
    };

    Notification::direct(vec![notice.employee_id], heading, message, kind).about(notice.source_id)
}

#[async_trait]
impl ReviewNotifier for NotificationService {
    async fn notify_employee(&self, notice: &ReviewNotice) -> Result<(), PortError> {
        self.send(employee_notification(notice)).await?;
        Ok(())
    }

    async fn notify_payroll_managers(&self, notice: &ReviewNotice) -> Result<(), PortError> {
        let title = format!("{} Pending Approval", subject_title(notice.subject));
        let message = format!(
            "{} {} ({}) was approved by a Payroll Specialist and needs your confirmation.",
            subject_title(notice.subject),
            notice.subject_number,
            notice.subject_label
        );
        self.send_to_role(SystemRole::PayrollManager, |recipients| {
            Notification::direct(recipients, title, message, NotificationType::Alert).about(notice.source_id)
        })
        .await?;
        Ok(())
    }

    async fn notify_finance_staff(&self, notice: &ReviewNotice, amount: Decimal) -> Result<(), PortError> {
        let title = match notice.subject {
            CaseKind::Claim => REFUND_REQUIRED_TITLE.to_string(),
            CaseKind::Dispute => format!("{} Approved - Refund Required", subject_title(notice.subject)),
        };
        let message = format!(
            "{} {} has been approved for {}. Please generate the refund.",
            subject_title(notice.subject),
            notice.subject_number,
            amount.normalize()
        );
        self.send_to_role(SystemRole::FinanceStaff, |recipients| {
            Notification::direct(recipients, title, message, NotificationType::Alert).about(notice.source_id)
        })
        .await?;
        Ok(())
    }
}
