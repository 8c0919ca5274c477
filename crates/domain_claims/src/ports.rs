//! Payroll Tracking Ports
//!
//! Storage and notification interfaces the review services depend on. The
//! PostgreSQL adapters live in `infra_db`; the in-memory adapters in [`mock`]
//! back unit tests and the HTTP test suite.
//!
//! ```rust,ignore
//! let service = ClaimService::new(
//!     Arc::new(PostgresClaimAdapter::new(pool.clone())),
//!     Arc::new(PostgresRefundAdapter::new(pool)),
//!     Arc::new(notification_service),
//!     WorkflowPolicy::for_claims(),
//! );
//! ```

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use core_kernel::{DomainPort, EmployeeId, HealthCheckable, PortError, RefundId};

use crate::claim::Claim;
use crate::dispute::Dispute;
use crate::refund::{Refund, RefundSource, RefundStatus};
use crate::review::ReviewCase;
use crate::status::{CaseKind, ReviewStatus};

/// Filters for listing cases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseQuery {
    pub status: Option<ReviewStatus>,
    pub employee_id: Option<EmployeeId>,
}

impl CaseQuery {
    pub fn by_status(status: ReviewStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn by_employee(employee_id: EmployeeId) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }

    pub fn matches<C: ReviewCase>(&self, case: &C) -> bool {
        self.status.map_or(true, |s| case.status() == s)
            && self.employee_id.map_or(true, |e| case.employee_id() == e)
    }
}

/// Store for claims or disputes, keyed by business number
#[async_trait]
pub trait CasePort<C: ReviewCase>: DomainPort + HealthCheckable {
    async fn find_by_number(&self, number: &str) -> Result<Option<C>, PortError>;

    async fn number_exists(&self, number: &str) -> Result<bool, PortError>;

    /// Total number of stored cases, used to seed number generation
    async fn count(&self) -> Result<u64, PortError>;

    /// Fails with `PortError::Conflict` when the business number is taken
    async fn insert(&self, case: &C) -> Result<(), PortError>;

    /// Overwrites the stored case
    async fn save(&self, case: &C) -> Result<(), PortError>;

    /// Matching cases, newest first
    async fn list(&self, query: CaseQuery) -> Result<Vec<C>, PortError>;
}

pub type ClaimPort = dyn CasePort<Claim>;
pub type DisputePort = dyn CasePort<Dispute>;

#[async_trait]
pub trait RefundPort: DomainPort + HealthCheckable {
    async fn insert(&self, refund: &Refund) -> Result<(), PortError>;

    async fn save(&self, refund: &Refund) -> Result<(), PortError>;

    /// Fails with `PortError::NotFound` when absent
    async fn get(&self, id: RefundId) -> Result<Refund, PortError>;

    /// Every refund ever created for the source, oldest first
    async fn find_for_source(&self, source: RefundSource) -> Result<Vec<Refund>, PortError>;

    /// Ids of all sources of the given kind that have at least one refund
    async fn sources_with_refunds(&self, kind: CaseKind) -> Result<HashSet<Uuid>, PortError>;

    async fn list_by_status(&self, status: RefundStatus) -> Result<Vec<Refund>, PortError>;
}

/// Event a notice reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewEventKind {
    UnderReview,
    Rejected,
    Approved,
}

impl ReviewEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewEventKind::UnderReview => "under_review",
            ReviewEventKind::Rejected => "rejected",
            ReviewEventKind::Approved => "approved",
        }
    }
}

/// Payload handed to the notification sink on each transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewNotice {
    pub subject: CaseKind,
    pub subject_number: String,
    pub subject_label: String,
    pub event: ReviewEventKind,
    /// Owner of the case
    pub employee_id: EmployeeId,
    /// Database id of the claim or dispute
    pub source_id: Uuid,
}

impl ReviewNotice {
    pub fn for_case<C: ReviewCase>(case: &C, event: ReviewEventKind) -> Self {
        Self {
            subject: C::KIND,
            subject_number: case.number().to_string(),
            subject_label: case.summary().to_string(),
            event,
            employee_id: case.employee_id(),
            source_id: case.source_id(),
        }
    }
}

/// Best-effort notification sink
///
/// Callers log and discard failures; a transition never fails because a
/// notification could not be delivered.
#[async_trait]
pub trait ReviewNotifier: Send + Sync + 'static {
    async fn notify_employee(&self, notice: &ReviewNotice) -> Result<(), PortError>;

    async fn notify_payroll_managers(&self, notice: &ReviewNotice) -> Result<(), PortError>;

    async fn notify_finance_staff(&self, notice: &ReviewNotice, amount: Decimal) -> Result<(), PortError>;
}

/// In-memory adapters for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use core_kernel::HealthCheckResult;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory store for claims or disputes
    #[derive(Debug)]
    pub struct MockCasePort<C: ReviewCase> {
        cases: Arc<RwLock<HashMap<String, C>>>,
    }

    impl<C: ReviewCase> Default for MockCasePort<C> {
        fn default() -> Self {
            Self {
                cases: Arc::new(RwLock::new(HashMap::new())),
            }
        }
    }

    impl<C: ReviewCase> MockCasePort<C> {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store, bypassing the workflow
        pub async fn with_cases(cases: Vec<C>) -> Self {
            let port = Self::new();
            {
                let mut store = port.cases.write().await;
                for case in cases {
                    store.insert(case.number().to_string(), case);
                }
            }
            port
        }
    }

    impl<C: ReviewCase> DomainPort for MockCasePort<C> {}

    #[async_trait]
    impl<C: ReviewCase> HealthCheckable for MockCasePort<C> {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy(format!("mock-{}-port", C::KIND.noun()))
        }
    }

    #[async_trait]
    impl<C: ReviewCase> CasePort<C> for MockCasePort<C> {
        async fn find_by_number(&self, number: &str) -> Result<Option<C>, PortError> {
            Ok(self.cases.read().await.get(number).cloned())
        }

        async fn number_exists(&self, number: &str) -> Result<bool, PortError> {
            Ok(self.cases.read().await.contains_key(number))
        }

        async fn count(&self) -> Result<u64, PortError> {
            Ok(self.cases.read().await.len() as u64)
        }

        async fn insert(&self, case: &C) -> Result<(), PortError> {
            let mut cases = self.cases.write().await;
            if cases.contains_key(case.number()) {
                return Err(PortError::conflict(format!(
                    "{} number {} already exists",
                    C::KIND.title(),
                    case.number()
                )));
            }
            cases.insert(case.number().to_string(), case.clone());
            Ok(())
        }

        async fn save(&self, case: &C) -> Result<(), PortError> {
            let mut cases = self.cases.write().await;
            if !cases.contains_key(case.number()) {
                return Err(PortError::not_found(C::KIND.title(), case.number()));
            }
            cases.insert(case.number().to_string(), case.clone());
            Ok(())
        }

        async fn list(&self, query: CaseQuery) -> Result<Vec<C>, PortError> {
            let mut found: Vec<C> = self
                .cases
                .read()
                .await
                .values()
                .filter(|c| query.matches(*c))
                .cloned()
                .collect();
            found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
            Ok(found)
        }
    }

    /// In-memory refund store
    #[derive(Debug, Default)]
    pub struct MockRefundPort {
        refunds: Arc<RwLock<Vec<Refund>>>,
    }

    impl MockRefundPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_refunds(refunds: Vec<Refund>) -> Self {
            let port = Self::new();
            port.refunds.write().await.extend(refunds);
            port
        }

        pub async fn all(&self) -> Vec<Refund> {
            self.refunds.read().await.clone()
        }
    }

    impl DomainPort for MockRefundPort {}

    #[async_trait]
    impl HealthCheckable for MockRefundPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-refund-port")
        }
    }

    #[async_trait]
    impl RefundPort for MockRefundPort {
        async fn insert(&self, refund: &Refund) -> Result<(), PortError> {
            self.refunds.write().await.push(refund.clone());
            Ok(())
        }

        async fn save(&self, refund: &Refund) -> Result<(), PortError> {
            let mut refunds = self.refunds.write().await;
            let slot = refunds
                .iter_mut()
                .find(|r| r.id == refund.id)
                .ok_or_else(|| PortError::not_found("Refund", refund.id))?;
            *slot = refund.clone();
            Ok(())
        }

        async fn get(&self, id: RefundId) -> Result<Refund, PortError> {
            self.refunds
                .read()
                .await
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Refund", id))
        }

        async fn find_for_source(&self, source: RefundSource) -> Result<Vec<Refund>, PortError> {
            Ok(self
                .refunds
                .read()
                .await
                .iter()
                .filter(|r| r.source == source)
                .cloned()
                .collect())
        }

        async fn sources_with_refunds(&self, kind: CaseKind) -> Result<HashSet<Uuid>, PortError> {
            Ok(self
                .refunds
                .read()
                .await
                .iter()
                .filter(|r| r.source.kind() == kind)
                .map(|r| r.source.source_uuid())
                .collect())
        }

        async fn list_by_status(&self, status: RefundStatus) -> Result<Vec<Refund>, PortError> {
            Ok(self
                .refunds
                .read()
                .await
                .iter()
                .filter(|r| r.status == status)
                .cloned()
                .collect())
        }
    }

    /// Who a recorded notice was addressed to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum NoticeTarget {
        Employee,
        PayrollManagers,
        FinanceStaff,
    }

    /// Captures every notice for later assertions
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Arc<RwLock<Vec<(NoticeTarget, ReviewNotice, Option<Decimal>)>>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn sent(&self) -> Vec<(NoticeTarget, ReviewNotice, Option<Decimal>)> {
            self.sent.read().await.clone()
        }

        pub async fn events_for(&self, target: NoticeTarget) -> Vec<ReviewEventKind> {
            self.sent
                .read()
                .await
                .iter()
                .filter(|(t, _, _)| *t == target)
                .map(|(_, n, _)| n.event)
                .collect()
        }
    }

    #[async_trait]
    impl ReviewNotifier for RecordingNotifier {
        async fn notify_employee(&self, notice: &ReviewNotice) -> Result<(), PortError> {
            self.sent
                .write()
                .await
                .push((NoticeTarget::Employee, notice.clone(), None));
            Ok(())
        }

        async fn notify_payroll_managers(&self, notice: &ReviewNotice) -> Result<(), PortError> {
            self.sent
                .write()
                .await
                .push((NoticeTarget::PayrollManagers, notice.clone(), None));
            Ok(())
        }

        async fn notify_finance_staff(&self, notice: &ReviewNotice, amount: Decimal) -> Result<(), PortError> {
            self.sent
                .write()
                .await
                .push((NoticeTarget::FinanceStaff, notice.clone(), Some(amount)));
            Ok(())
        }
    }

    /// Notifier whose every delivery fails
    #[derive(Debug, Default, Clone, Copy)]
    pub struct FailingNotifier;

    #[async_trait]
    impl ReviewNotifier for FailingNotifier {
        async fn notify_employee(&self, _notice: &ReviewNotice) -> Result<(), PortError> {
            Err(PortError::unavailable("notifications"))
        }

        async fn notify_payroll_managers(&self, _notice: &ReviewNotice) -> Result<(), PortError> {
            Err(PortError::unavailable("notifications"))
        }

        async fn notify_finance_staff(&self, _notice: &ReviewNotice, _amount: Decimal) -> Result<(), PortError> {
            Err(PortError::unavailable("notifications"))
        }
    }
}
