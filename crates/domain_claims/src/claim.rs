//! Expense claim aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{ClaimId, EmployeeId};
use crate::error::ClaimError;
use crate::refund::{resolve_claim_refund_amount, RefundSource};
use crate::review::{ReviewCase, ReviewState};
use crate::status::{CaseKind, ReviewStatus};
use crate::validation::{optional_text, require_non_negative, require_text};

/// Submission payload for a new expense claim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewClaim {
    pub description: Option<String>,
    pub claim_type: Option<String>,
    pub amount: Option<Decimal>,
    /// Caller-chosen business number; generated when absent
    pub claim_number: Option<String>,
}

impl NewClaim {
    pub fn new(description: impl Into<String>, claim_type: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: Some(description.into()),
            claim_type: Some(claim_type.into()),
            amount: Some(amount),
            claim_number: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.claim_number = Some(number.into());
        self
    }

    /// Explicit business number, trimmed, if one was supplied
    pub fn requested_number(&self) -> Option<String> {
        optional_text(self.claim_number.as_deref())
    }

    /// Field checks that run before any number is reserved
    pub fn validate(&self) -> Result<(), ClaimError> {
        require_text(self.description.as_deref(), "Description is required and cannot be empty")?;
        require_text(self.claim_type.as_deref(), "Claim type is required and cannot be empty")?;
        let amount = self
            .amount
            .ok_or_else(|| ClaimError::validation("Amount is required"))?;
        require_non_negative(amount, "Amount")?;
        Ok(())
    }
}

/// An employee's request to be reimbursed for an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claim_number: String,
    pub description: String,
    pub claim_type: String,
    pub employee_id: EmployeeId,
    /// Amount requested by the employee
    pub amount: Decimal,
    #[serde(flatten)]
    pub review: ReviewState,
    pub created_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a claim in `UNDER_REVIEW`
    pub fn submit(
        claim_number: impl Into<String>,
        employee_id: EmployeeId,
        request: &NewClaim,
        now: DateTime<Utc>,
    ) -> Result<Self, ClaimError> {
        request.validate()?;
        let description = require_text(request.description.as_deref(), "Description is required and cannot be empty")?;
        let claim_type = require_text(request.claim_type.as_deref(), "Claim type is required and cannot be empty")?;
        let amount = request
            .amount
            .ok_or_else(|| ClaimError::validation("Amount is required"))?;

        Ok(Self {
            id: ClaimId::new_v7(),
            claim_number: claim_number.into(),
            description,
            claim_type,
            employee_id,
            amount,
            review: ReviewState::submitted(now),
            created_at: now,
        })
    }

    pub fn status(&self) -> ReviewStatus {
        self.review.status
    }

    pub fn approved_amount(&self) -> Option<Decimal> {
        self.review.approved_amount
    }

    /// Human-readable audit text derived from the decision log
    pub fn resolution_comment(&self) -> Option<String> {
        self.review.decision_log.render(CaseKind::Claim)
    }
}

impl ReviewCase for Claim {
    const KIND: CaseKind = CaseKind::Claim;

    fn source_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn number(&self) -> &str {
        &self.claim_number
    }

    fn summary(&self) -> &str {
        &self.description
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    fn amount_cap(&self) -> Option<Decimal> {
        Some(self.amount)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn review(&self) -> &ReviewState {
        &self.review
    }

    fn review_mut(&mut self) -> &mut ReviewState {
        &mut self.review
    }

    fn refund_source(&self) -> RefundSource {
        RefundSource::Claim(self.id)
    }

    fn resolve_refund_amount(&self, override_amount: Option<Decimal>) -> Result<Decimal, ClaimError> {
        resolve_claim_refund_amount(&self.review, self.amount, override_amount)
    }

    fn default_refund_description(&self) -> String {
        format!("Refund for approved expense claim {}", self.claim_number)
    }
}
