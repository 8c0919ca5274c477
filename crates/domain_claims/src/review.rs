//! Two-person review state machine shared by claims and disputes
//!
//! A payroll specialist proposes (approve with an amount, or reject), then a
//! payroll manager confirms or rejects. Every check runs before the case is
//! touched, so a failed action leaves it exactly as it was.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

use core_kernel::EmployeeId;
use crate::decision_log::{DecisionEntry, DecisionLog, DecisionStage};
use crate::error::ClaimError;
use crate::refund::RefundSource;
use crate::status::{CaseKind, ReviewStatus};
use crate::validation::{check_amount, require_rejection_reason};

/// Review fields common to claims and disputes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub status: ReviewStatus,
    /// Never above the claimed amount for claims
    pub approved_amount: Option<Decimal>,
    pub decision_log: DecisionLog,
    pub rejection_reason: Option<String>,
    pub payroll_specialist_id: Option<EmployeeId>,
    pub payroll_manager_id: Option<EmployeeId>,
    pub finance_staff_id: Option<EmployeeId>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewState {
    /// State of a freshly submitted case
    pub fn submitted(now: DateTime<Utc>) -> Self {
        Self {
            status: ReviewStatus::UnderReview,
            approved_amount: None,
            decision_log: DecisionLog::new(),
            rejection_reason: None,
            payroll_specialist_id: None,
            payroll_manager_id: None,
            finance_staff_id: None,
            updated_at: now,
        }
    }

    fn move_to(&mut self, target: ReviewStatus, now: DateTime<Utc>) -> Result<(), ClaimError> {
        if !self.status.can_transition_to(target) {
            return Err(ClaimError::invalid_state(format!(
                "Invalid status transition from {} to {}",
                self.status, target
            )));
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

/// A reviewable case: an expense claim or a payslip dispute
pub trait ReviewCase: Clone + Send + Sync + 'static {
    const KIND: CaseKind;

    /// Database-native identifier
    fn source_id(&self) -> Uuid;
    /// Business number such as `CLAIM-3`
    fn number(&self) -> &str;
    /// Short text shown in notifications
    fn summary(&self) -> &str;
    fn employee_id(&self) -> EmployeeId;
    /// Upper bound for reviewer amounts, when the case carries one
    fn amount_cap(&self) -> Option<Decimal>;
    fn created_at(&self) -> DateTime<Utc>;
    fn review(&self) -> &ReviewState;
    fn review_mut(&mut self) -> &mut ReviewState;
    fn refund_source(&self) -> RefundSource;
    /// Amount a new refund pays out
    fn resolve_refund_amount(&self, override_amount: Option<Decimal>) -> Result<Decimal, ClaimError>;
    fn default_refund_description(&self) -> String;

    fn status(&self) -> ReviewStatus {
        self.review().status
    }
}

/// Reviewer verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl FromStr for ReviewAction {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(ClaimError::validation(
                "Invalid action. Must be \"approve\" or \"reject\"",
            )),
        }
    }
}

/// Input to a specialist or manager review step
///
/// `amount` is the proposed amount for a specialist and the optional final
/// override for a manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDecision {
    pub action: ReviewAction,
    pub amount: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub comment: Option<String>,
}

impl ReviewDecision {
    pub fn approve(amount: Option<Decimal>) -> Self {
        Self {
            action: ReviewAction::Approve,
            amount,
            rejection_reason: None,
            comment: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            action: ReviewAction::Reject,
            amount: None,
            rejection_reason: Some(reason.into()),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// What a review step did, used to pick notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    ForwardedToManager { proposed: Decimal },
    Rejected,
    Approved { final_amount: Option<Decimal> },
}

/// Knobs for the workflow services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// Prefix for generated business numbers
    pub number_prefix: String,
    /// Fail manager confirmation when the log lacks a specialist approval
    /// instead of repairing it
    pub strict_decision_log: bool,
}

impl WorkflowPolicy {
    pub fn for_claims() -> Self {
        Self {
            number_prefix: "CLAIM-".to_string(),
            strict_decision_log: false,
        }
    }

    pub fn for_disputes() -> Self {
        Self {
            number_prefix: "DISP-".to_string(),
            strict_decision_log: false,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.number_prefix = prefix.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_decision_log = strict;
        self
    }
}

fn ensure_not_final<C: ReviewCase>(case: &C) -> Result<(), ClaimError> {
    match case.status() {
        ReviewStatus::Approved => Err(ClaimError::invalid_state(format!(
            "{} has already been approved and cannot be modified",
            C::KIND.title()
        ))),
        ReviewStatus::Rejected => Err(ClaimError::invalid_state(format!(
            "{} has already been rejected and cannot be modified",
            C::KIND.title()
        ))),
        _ => Ok(()),
    }
}

fn record_rejection(
    state: &mut ReviewState,
    stage: DecisionStage,
    actor: EmployeeId,
    reason: String,
    comment: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), ClaimError> {
    state.move_to(ReviewStatus::Rejected, now)?;
    state.decision_log.append(
        DecisionEntry::new(stage, Some(actor), now)
            .with_note(comment)
            .with_reason(reason.clone()),
    );
    state.rejection_reason = Some(reason);
    Ok(())
}

/// Applies a payroll specialist's decision to a case under review
pub fn apply_specialist_decision<C: ReviewCase>(
    case: &mut C,
    specialist: EmployeeId,
    decision: &ReviewDecision,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ClaimError> {
    ensure_not_final(case)?;

    if case.status() == ReviewStatus::PendingManagerApproval {
        return Err(ClaimError::invalid_state(format!(
            "{} has already been approved by a Payroll Specialist and is awaiting manager confirmation",
            C::KIND.title()
        )));
    }
    if case.status() != ReviewStatus::UnderReview {
        return Err(ClaimError::invalid_state(format!(
            "{} is not in under review status",
            C::KIND.title()
        )));
    }

    match decision.action {
        ReviewAction::Approve => {
            let label = C::KIND.amount_label();
            let amount = decision.amount.ok_or_else(|| {
                ClaimError::validation(format!(
                    "{} is required when approving a {}",
                    label,
                    C::KIND.noun()
                ))
            })?;
            check_amount(amount, case.amount_cap(), label)?;

            let state = case.review_mut();
            state.move_to(ReviewStatus::PendingManagerApproval, now)?;
            state.approved_amount = Some(amount);
            state.payroll_specialist_id = Some(specialist);
            state.decision_log.append(
                DecisionEntry::new(DecisionStage::SpecialistApproved, Some(specialist), now)
                    .with_amount(Some(amount))
                    .with_note(decision.comment.as_deref()),
            );
            Ok(ReviewOutcome::ForwardedToManager { proposed: amount })
        }
        ReviewAction::Reject => {
            let reason = require_rejection_reason(decision.rejection_reason.as_deref(), C::KIND)?;
            let state = case.review_mut();
            state.payroll_specialist_id = Some(specialist);
            record_rejection(
                state,
                DecisionStage::SpecialistRejected,
                specialist,
                reason,
                decision.comment.as_deref(),
                now,
            )?;
            Ok(ReviewOutcome::Rejected)
        }
    }
}

/// Applies a payroll manager's confirmation or rejection
///
/// The final amount is the manager's override when given, otherwise the
/// specialist's most recent proposal. Without either the stored amount is
/// left alone and finance has to supply one when generating the refund.
pub fn apply_manager_decision<C: ReviewCase>(
    case: &mut C,
    manager: EmployeeId,
    decision: &ReviewDecision,
    policy: &WorkflowPolicy,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ClaimError> {
    let number = case.number().to_string();
    let title = C::KIND.title();

    match decision.action {
        ReviewAction::Reject => {
            let reason = require_rejection_reason(decision.rejection_reason.as_deref(), C::KIND)?;
            ensure_not_final(case)?;
            if case.status() != ReviewStatus::PendingManagerApproval {
                return Err(ClaimError::invalid_state(format!(
                    "{} {} must be in \"pending payroll Manager approval\" status to be rejected by a manager. Current status: {}",
                    title,
                    number,
                    case.status()
                )));
            }

            let state = case.review_mut();
            state.payroll_manager_id = Some(manager);
            record_rejection(
                state,
                DecisionStage::ManagerRejected,
                manager,
                reason,
                decision.comment.as_deref(),
                now,
            )?;
            Ok(ReviewOutcome::Rejected)
        }
        ReviewAction::Approve => {
            ensure_not_final(case)?;
            if case.status() != ReviewStatus::PendingManagerApproval {
                return Err(ClaimError::invalid_state(format!(
                    "{} must be approved by Payroll Specialist before manager confirmation",
                    title
                )));
            }

            let log = &case.review().decision_log;
            let needs_repair = !log.has_specialist_approval();
            if needs_repair && policy.strict_decision_log {
                return Err(ClaimError::invalid_state(format!(
                    "{} {} is awaiting manager approval but has no recorded specialist approval",
                    title, number
                )));
            }
            if log.has_manager_confirmation() {
                return Err(ClaimError::invalid_state(format!(
                    "{} {} has already been confirmed by a manager",
                    title, number
                )));
            }

            let override_amount = match decision.amount {
                Some(amount) => Some(check_amount(amount, case.amount_cap(), C::KIND.amount_label())?),
                None => None,
            };
            let final_amount = override_amount.or_else(|| log.proposed_amount());

            let state = case.review_mut();
            if needs_repair {
                warn!(
                    case = %number,
                    "Case is pending manager approval without a specialist decision; recording placeholder"
                );
                state
                    .decision_log
                    .append(DecisionEntry::new(DecisionStage::SpecialistMarkerRepaired, None, now));
            }

            state.move_to(ReviewStatus::Approved, now)?;
            state.payroll_manager_id = Some(manager);
            match final_amount {
                Some(amount) => state.approved_amount = Some(amount),
                None if state.approved_amount.is_none() => warn!(
                    case = %number,
                    "Confirmed without an approved amount; finance staff must specify one when generating the refund"
                ),
                None => {}
            }
            state.decision_log.append(
                DecisionEntry::new(DecisionStage::ManagerConfirmed, Some(manager), now)
                    .with_amount(final_amount)
                    .with_note(decision.comment.as_deref()),
            );

            Ok(ReviewOutcome::Approved { final_amount })
        }
    }
}
