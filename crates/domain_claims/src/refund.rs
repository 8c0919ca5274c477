//! Refunds and refund amount resolution

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{ClaimId, DisputeId, EmployeeId, RefundId};
use crate::error::ClaimError;
use crate::review::ReviewState;
use crate::status::CaseKind;
use crate::validation::{ensure_within_claimed, require_non_negative};

/// Document a refund pays out for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RefundSource {
    Claim(ClaimId),
    Dispute(DisputeId),
}

impl RefundSource {
    pub fn kind(&self) -> CaseKind {
        match self {
            RefundSource::Claim(_) => CaseKind::Claim,
            RefundSource::Dispute(_) => CaseKind::Dispute,
        }
    }

    pub fn source_uuid(&self) -> Uuid {
        match self {
            RefundSource::Claim(id) => *id.as_uuid(),
            RefundSource::Dispute(id) => *id.as_uuid(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Pending,
    Paid,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::Pending => "pending",
            RefundStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(RefundStatus::Pending),
            "paid" => Ok(RefundStatus::Paid),
            other => Err(format!("unknown refund status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundDetails {
    pub description: String,
    pub amount: Decimal,
}

/// Money owed back to an employee for an approved claim or dispute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub id: RefundId,
    pub source: RefundSource,
    pub employee_id: EmployeeId,
    pub finance_staff_id: Option<EmployeeId>,
    pub details: RefundDetails,
    pub status: RefundStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Refund {
    /// New refund awaiting payment
    pub fn pending(
        source: RefundSource,
        employee_id: EmployeeId,
        finance_staff_id: Option<EmployeeId>,
        details: RefundDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RefundId::new_v7(),
            source,
            employee_id,
            finance_staff_id,
            details,
            status: RefundStatus::Pending,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RefundStatus::Pending
    }

    pub fn mark_paid(&mut self, now: DateTime<Utc>) -> Result<(), ClaimError> {
        if self.status == RefundStatus::Paid {
            return Err(ClaimError::invalid_state(format!(
                "Refund {} has already been paid",
                self.id
            )));
        }
        self.status = RefundStatus::Paid;
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

/// Refund amount for an approved claim
///
/// Precedence: final amount in the log, proposed amount in the log, stored
/// non-zero approved amount. A caller override supersedes all three and must
/// stay within the claimed amount. With nothing else the requested amount
/// is paid.
pub fn resolve_claim_refund_amount(
    review: &ReviewState,
    claimed: Decimal,
    override_amount: Option<Decimal>,
) -> Result<Decimal, ClaimError> {
    let log = &review.decision_log;
    let mut amount = log
        .final_amount()
        .or_else(|| log.proposed_amount())
        .or_else(|| review.approved_amount.filter(|a| !a.is_zero()));

    if let Some(requested) = override_amount {
        require_non_negative(requested, "Refund amount")?;
        ensure_within_claimed(requested, claimed, "Refund amount")?;
        amount = Some(requested);
    }

    let amount = amount.unwrap_or(claimed);
    if amount <= Decimal::ZERO {
        return Err(ClaimError::amount(
            "No valid approved amount found. The Payroll Manager must set the approved amount when confirming the claim.",
        ));
    }
    Ok(amount)
}

/// Refund amount for an approved dispute; there is no requested amount to
/// fall back to
pub fn resolve_dispute_refund_amount(
    review: &ReviewState,
    override_amount: Option<Decimal>,
) -> Result<Decimal, ClaimError> {
    let log = &review.decision_log;
    let mut amount = log.final_amount().or_else(|| log.proposed_amount());

    if let Some(requested) = override_amount {
        require_non_negative(requested, "Refund amount")?;
        amount = Some(requested);
    }

    match amount {
        Some(a) if a > Decimal::ZERO => Ok(a),
        _ => Err(ClaimError::amount(
            "No valid refund amount found. The Payroll Manager must set the refund amount when confirming the dispute, or provide one when generating the refund.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision_log::{DecisionEntry, DecisionStage};
    use rust_decimal_macros::dec;

    fn state_with(entries: Vec<(DecisionStage, Option<Decimal>)>) -> ReviewState {
        let now = Utc::now();
        let mut state = ReviewState::submitted(now);
        for (stage, amount) in entries {
            state
                .decision_log
                .append(DecisionEntry::new(stage, Some(EmployeeId::new()), now).with_amount(amount));
        }
        state
    }

    #[test]
    fn test_final_amount_wins() {
        let state = state_with(vec![
            (DecisionStage::SpecialistApproved, Some(dec!(400))),
            (DecisionStage::ManagerConfirmed, Some(dec!(350))),
        ]);
        assert_eq!(resolve_claim_refund_amount(&state, dec!(500), None).unwrap(), dec!(350));
    }

    #[test]
    fn test_proposed_amount_used_without_final() {
        let state = state_with(vec![
            (DecisionStage::SpecialistApproved, Some(dec!(400))),
            (DecisionStage::ManagerConfirmed, None),
        ]);
        assert_eq!(resolve_claim_refund_amount(&state, dec!(500), None).unwrap(), dec!(400));
    }

    #[test]
    fn test_zero_stored_amount_falls_back_to_claimed() {
        let mut state = state_with(vec![]);
        state.approved_amount = Some(Decimal::ZERO);
        assert_eq!(resolve_claim_refund_amount(&state, dec!(120), None).unwrap(), dec!(120));
    }

    #[test]
    fn test_override_supersedes_and_is_capped() {
        let state = state_with(vec![(DecisionStage::ManagerConfirmed, Some(dec!(300)))]);
        assert_eq!(
            resolve_claim_refund_amount(&state, dec!(500), Some(dec!(250))).unwrap(),
            dec!(250)
        );

        let err = resolve_claim_refund_amount(&state, dec!(500), Some(dec!(600))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Refund amount (600) cannot exceed the claimed amount (500)."
        );
    }

    #[test]
    fn test_zero_claim_cannot_be_refunded() {
        let state = state_with(vec![]);
        assert!(resolve_claim_refund_amount(&state, Decimal::ZERO, None).is_err());
    }

    #[test]
    fn test_dispute_needs_an_amount() {
        let state = state_with(vec![]);
        assert!(resolve_dispute_refund_amount(&state, None).is_err());
        assert_eq!(resolve_dispute_refund_amount(&state, Some(dec!(80))).unwrap(), dec!(80));
        assert!(resolve_dispute_refund_amount(&state, Some(Decimal::ZERO)).is_err());
    }

    #[test]
    fn test_mark_paid_once() {
        let source = RefundSource::Claim(ClaimId::new());
        let details = RefundDetails { description: "x".into(), amount: dec!(10) };
        let mut refund = Refund::pending(source, EmployeeId::new(), None, details, Utc::now());

        refund.mark_paid(Utc::now()).unwrap();
        assert_eq!(refund.status, RefundStatus::Paid);
        assert!(refund.paid_at.is_some());
        assert!(refund.mark_paid(Utc::now()).is_err());
    }
}
