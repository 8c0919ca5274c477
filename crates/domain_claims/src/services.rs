//! Review workflow services
//!
//! [`ReviewService`] drives a case from submission to refund. It is generic
//! over the case type; [`ClaimService`] and [`DisputeService`] expose the
//! operations under claim and dispute names.
//!
//! Each step loads the case, applies the pure transition from
//! [`crate::review`], persists, and only then notifies. Notification failures
//! are logged and dropped.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use core_kernel::{Actor, EmployeeId, PortError, RefundId};

use crate::claim::{Claim, NewClaim};
use crate::dispute::{Dispute, NewDispute};
use crate::error::ClaimError;
use crate::numbering::next_business_number;
use crate::ports::{CasePort, CaseQuery, RefundPort, ReviewEventKind, ReviewNotice, ReviewNotifier};
use crate::refund::{Refund, RefundDetails, RefundStatus};
use crate::review::{
    apply_manager_decision, apply_specialist_decision, ReviewCase, ReviewDecision, ReviewOutcome,
    WorkflowPolicy,
};
use crate::status::ReviewStatus;
use crate::validation::optional_text;

/// Two-person review workflow over one kind of case
pub struct ReviewService<C: ReviewCase> {
    cases: Arc<dyn CasePort<C>>,
    refunds: Arc<dyn RefundPort>,
    notifier: Arc<dyn ReviewNotifier>,
    policy: WorkflowPolicy,
}

pub type ClaimService = ReviewService<Claim>;
pub type DisputeService = ReviewService<Dispute>;

impl<C: ReviewCase> Clone for ReviewService<C> {
    fn clone(&self) -> Self {
        Self {
            cases: Arc::clone(&self.cases),
            refunds: Arc::clone(&self.refunds),
            notifier: Arc::clone(&self.notifier),
            policy: self.policy.clone(),
        }
    }
}

impl<C: ReviewCase> ReviewService<C> {
    pub fn new(
        cases: Arc<dyn CasePort<C>>,
        refunds: Arc<dyn RefundPort>,
        notifier: Arc<dyn ReviewNotifier>,
        policy: WorkflowPolicy,
    ) -> Self {
        Self {
            cases,
            refunds,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    /// Path segments arrive untrimmed
    async fn load(&self, number: &str) -> Result<C, ClaimError> {
        let number = number.trim();
        self.cases
            .find_by_number(number)
            .await?
            .ok_or_else(|| ClaimError::not_found(C::KIND.title(), number))
    }

    async fn allocate_number(&self, requested: Option<String>) -> Result<String, ClaimError> {
        match requested {
            Some(number) => {
                if self.cases.number_exists(&number).await? {
                    return Err(ClaimError::validation(format!(
                        "A {} with this ID already exists",
                        C::KIND.noun()
                    )));
                }
                Ok(number)
            }
            None => next_business_number(self.cases.as_ref(), &self.policy.number_prefix).await,
        }
    }

    async fn store_new(&self, case: C) -> Result<C, ClaimError> {
        self.cases.insert(&case).await.map_err(|e| match e {
            PortError::Conflict { .. } => {
                ClaimError::validation(format!("A {} with this ID already exists", C::KIND.noun()))
            }
            other => ClaimError::Port(other),
        })?;
        info!(
            number = case.number(),
            employee = %case.employee_id(),
            "{} submitted",
            C::KIND.title()
        );
        Ok(case)
    }

    async fn specialist_review(
        &self,
        number: &str,
        specialist: EmployeeId,
        decision: ReviewDecision,
    ) -> Result<C, ClaimError> {
        let mut case = self.load(number).await?;
        let outcome = apply_specialist_decision(&mut case, specialist, &decision, Utc::now())?;
        self.cases.save(&case).await?;

        info!(number, status = %case.status(), "Payroll specialist reviewed {}", C::KIND.noun());
        self.announce(&case, outcome).await;
        Ok(case)
    }

    async fn manager_review(
        &self,
        number: &str,
        manager: EmployeeId,
        decision: ReviewDecision,
    ) -> Result<C, ClaimError> {
        let mut case = self.load(number).await?;
        let outcome = apply_manager_decision(&mut case, manager, &decision, &self.policy, Utc::now())?;
        self.cases.save(&case).await?;

        info!(number, status = %case.status(), "Payroll manager reviewed {}", C::KIND.noun());
        self.announce(&case, outcome).await;
        Ok(case)
    }

    async fn refund(
        &self,
        number: &str,
        finance_staff: EmployeeId,
        description: Option<String>,
        amount_override: Option<Decimal>,
    ) -> Result<Refund, ClaimError> {
        let mut case = self.load(number).await?;
        if case.status() != ReviewStatus::Approved {
            return Err(ClaimError::invalid_state(format!(
                "Refund can only be generated for approved {}s",
                C::KIND.noun()
            )));
        }

        let existing = self.refunds.find_for_source(case.refund_source()).await?;

        // Resume after a partial failure: the refund may exist while the case
        // never recorded who issued it
        if case.review().finance_staff_id.is_none() {
            if let Some(staff) = existing.iter().find_map(|r| r.finance_staff_id) {
                case.review_mut().finance_staff_id = Some(staff);
                self.cases.save(&case).await?;
            }
        }

        if existing.iter().any(Refund::is_pending) {
            return Err(ClaimError::invalid_state(format!(
                "A pending refund already exists for this {}",
                C::KIND.noun()
            )));
        }

        let amount = case.resolve_refund_amount(amount_override)?;

        let now = Utc::now();
        {
            let state = case.review_mut();
            state.finance_staff_id = Some(finance_staff);
            state.updated_at = now;
        }
        self.cases.save(&case).await?;

        let details = RefundDetails {
            description: optional_text(description.as_deref())
                .unwrap_or_else(|| case.default_refund_description()),
            amount,
        };
        let refund = Refund::pending(
            case.refund_source(),
            case.employee_id(),
            Some(finance_staff),
            details,
            now,
        );
        self.refunds.insert(&refund).await?;

        info!(number, refund = %refund.id, amount = %amount, "Refund generated");
        Ok(refund)
    }

    async fn visible_to(&self, number: &str, viewer: &Actor) -> Result<C, ClaimError> {
        let case = self.load(number).await?;
        if viewer.can_view_all_cases() || case.employee_id() == viewer.employee_id {
            Ok(case)
        } else {
            Err(ClaimError::not_found(C::KIND.title(), number))
        }
    }

    async fn list(&self, query: CaseQuery) -> Result<Vec<C>, ClaimError> {
        Ok(self.cases.list(query).await?)
    }

    async fn approved_without_refund(&self) -> Result<Vec<C>, ClaimError> {
        let refunded = self.refunds.sources_with_refunds(C::KIND).await?;
        let approved = self.cases.list(CaseQuery::by_status(ReviewStatus::Approved)).await?;
        Ok(approved
            .into_iter()
            .filter(|c| !refunded.contains(&c.source_id()))
            .collect())
    }

    async fn announce(&self, case: &C, outcome: ReviewOutcome) {
        match outcome {
            ReviewOutcome::ForwardedToManager { .. } => {
                let notice = ReviewNotice::for_case(case, ReviewEventKind::UnderReview);
                report(self.notifier.notify_employee(&notice).await, "employee", case.number());
                report(
                    self.notifier.notify_payroll_managers(&notice).await,
                    "payroll managers",
                    case.number(),
                );
            }
            ReviewOutcome::Rejected => {
                let notice = ReviewNotice::for_case(case, ReviewEventKind::Rejected);
                report(self.notifier.notify_employee(&notice).await, "employee", case.number());
            }
            ReviewOutcome::Approved { .. } => {
                let notice = ReviewNotice::for_case(case, ReviewEventKind::Approved);
                report(self.notifier.notify_employee(&notice).await, "employee", case.number());

                let amount = case
                    .review()
                    .approved_amount
                    .or_else(|| case.amount_cap())
                    .unwrap_or_default();
                report(
                    self.notifier.notify_finance_staff(&notice, amount).await,
                    "finance staff",
                    case.number(),
                );
            }
        }
    }
}

fn report(result: Result<(), PortError>, audience: &str, number: &str) {
    if let Err(error) = result {
        warn!(number, audience, %error, "Failed to send notification");
    }
}

impl ReviewService<Claim> {
    #[instrument(skip(self, request), fields(employee = %employee_id))]
    pub async fn create_claim(&self, employee_id: EmployeeId, request: NewClaim) -> Result<Claim, ClaimError> {
        request.validate()?;
        let number = self.allocate_number(request.requested_number()).await?;
        let claim = Claim::submit(number, employee_id, &request, Utc::now())?;
        self.store_new(claim).await
    }

    /// Payroll specialist approves (with a proposed amount) or rejects
    #[instrument(skip(self, decision))]
    pub async fn approve_or_reject_claim(
        &self,
        claim_number: &str,
        specialist_id: EmployeeId,
        decision: ReviewDecision,
    ) -> Result<Claim, ClaimError> {
        self.specialist_review(claim_number, specialist_id, decision).await
    }

    /// Payroll manager confirms or rejects a specialist-approved claim
    #[instrument(skip(self, decision))]
    pub async fn confirm_claim_approval(
        &self,
        claim_number: &str,
        manager_id: EmployeeId,
        decision: ReviewDecision,
    ) -> Result<Claim, ClaimError> {
        self.manager_review(claim_number, manager_id, decision).await
    }

    #[instrument(skip(self, description))]
    pub async fn generate_refund_for_claim(
        &self,
        claim_number: &str,
        finance_staff_id: EmployeeId,
        description: Option<String>,
        amount_override: Option<Decimal>,
    ) -> Result<Refund, ClaimError> {
        self.refund(claim_number, finance_staff_id, description, amount_override).await
    }

    /// Reviewers see every claim; everyone else only their own
    pub async fn get_claim(&self, claim_number: &str, viewer: &Actor) -> Result<Claim, ClaimError> {
        self.visible_to(claim_number, viewer).await
    }

    pub async fn employee_claims(&self, employee_id: EmployeeId) -> Result<Vec<Claim>, ClaimError> {
        self.list(CaseQuery::by_employee(employee_id)).await
    }

    pub async fn claims_under_review(&self) -> Result<Vec<Claim>, ClaimError> {
        self.list(CaseQuery::by_status(ReviewStatus::UnderReview)).await
    }

    pub async fn claims_pending_manager_approval(&self) -> Result<Vec<Claim>, ClaimError> {
        self.list(CaseQuery::by_status(ReviewStatus::PendingManagerApproval)).await
    }

    /// Approved claims that have never had a refund generated
    pub async fn approved_claims_awaiting_refund(&self) -> Result<Vec<Claim>, ClaimError> {
        self.approved_without_refund().await
    }
}

impl ReviewService<Dispute> {
    #[instrument(skip(self, request), fields(employee = %employee_id))]
    pub async fn create_dispute(&self, employee_id: EmployeeId, request: NewDispute) -> Result<Dispute, ClaimError> {
        request.validate()?;
        let number = self.allocate_number(request.requested_number()).await?;
        let dispute = Dispute::open(number, employee_id, &request, Utc::now())?;
        self.store_new(dispute).await
    }

    #[instrument(skip(self, decision))]
    pub async fn approve_or_reject_dispute(
        &self,
        dispute_number: &str,
        specialist_id: EmployeeId,
        decision: ReviewDecision,
    ) -> Result<Dispute, ClaimError> {
        self.specialist_review(dispute_number, specialist_id, decision).await
    }

    #[instrument(skip(self, decision))]
    pub async fn confirm_dispute_approval(
        &self,
        dispute_number: &str,
        manager_id: EmployeeId,
        decision: ReviewDecision,
    ) -> Result<Dispute, ClaimError> {
        self.manager_review(dispute_number, manager_id, decision).await
    }

    #[instrument(skip(self, description))]
    pub async fn generate_refund_for_dispute(
        &self,
        dispute_number: &str,
        finance_staff_id: EmployeeId,
        description: Option<String>,
        amount_override: Option<Decimal>,
    ) -> Result<Refund, ClaimError> {
        self.refund(dispute_number, finance_staff_id, description, amount_override).await
    }

    pub async fn get_dispute(&self, dispute_number: &str, viewer: &Actor) -> Result<Dispute, ClaimError> {
        self.visible_to(dispute_number, viewer).await
    }

    pub async fn employee_disputes(&self, employee_id: EmployeeId) -> Result<Vec<Dispute>, ClaimError> {
        self.list(CaseQuery::by_employee(employee_id)).await
    }

    pub async fn disputes_under_review(&self) -> Result<Vec<Dispute>, ClaimError> {
        self.list(CaseQuery::by_status(ReviewStatus::UnderReview)).await
    }

    pub async fn disputes_pending_manager_approval(&self) -> Result<Vec<Dispute>, ClaimError> {
        self.list(CaseQuery::by_status(ReviewStatus::PendingManagerApproval)).await
    }

    pub async fn approved_disputes_awaiting_refund(&self) -> Result<Vec<Dispute>, ClaimError> {
        self.approved_without_refund().await
    }
}

/// Finance-side refund bookkeeping
#[derive(Clone)]
pub struct RefundService {
    refunds: Arc<dyn RefundPort>,
}

impl RefundService {
    pub fn new(refunds: Arc<dyn RefundPort>) -> Self {
        Self { refunds }
    }

    #[instrument(skip(self))]
    pub async fn mark_refund_paid(
        &self,
        refund_id: RefundId,
        finance_staff_id: EmployeeId,
    ) -> Result<Refund, ClaimError> {
        let mut refund = self.refunds.get(refund_id).await.map_err(|e| match e {
            PortError::NotFound { .. } => ClaimError::not_found("Refund", refund_id.to_string()),
            other => ClaimError::Port(other),
        })?;
        refund.mark_paid(Utc::now())?;
        if refund.finance_staff_id.is_none() {
            refund.finance_staff_id = Some(finance_staff_id);
        }
        self.refunds.save(&refund).await?;

        info!(refund = %refund.id, "Refund marked as paid");
        Ok(refund)
    }

    pub async fn pending_refunds(&self) -> Result<Vec<Refund>, ClaimError> {
        Ok(self.refunds.list_by_status(RefundStatus::Pending).await?)
    }
}
