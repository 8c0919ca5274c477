//! Payslip dispute aggregate
//!
//! Disputes follow the same review pipeline as claims. They carry no
//! requested amount, so reviewer amounts are only checked for sign.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{DisputeId, EmployeeId};
use crate::error::ClaimError;
use crate::refund::{resolve_dispute_refund_amount, RefundSource};
use crate::review::{ReviewCase, ReviewState};
use crate::status::{CaseKind, ReviewStatus};
use crate::validation::{optional_text, require_text};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDispute {
    pub payslip_reference: Option<String>,
    pub description: Option<String>,
    pub dispute_number: Option<String>,
}

impl NewDispute {
    pub fn new(payslip_reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            payslip_reference: Some(payslip_reference.into()),
            description: Some(description.into()),
            dispute_number: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.dispute_number = Some(number.into());
        self
    }

    pub fn requested_number(&self) -> Option<String> {
        optional_text(self.dispute_number.as_deref())
    }

    pub fn validate(&self) -> Result<(), ClaimError> {
        require_text(self.payslip_reference.as_deref(), "Payslip reference is required")?;
        require_text(self.description.as_deref(), "Description is required and cannot be empty")?;
        Ok(())
    }
}

/// An employee's objection to a payslip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub dispute_number: String,
    pub payslip_reference: String,
    pub description: String,
    pub employee_id: EmployeeId,
    #[serde(flatten)]
    pub review: ReviewState,
    pub created_at: DateTime<Utc>,
}

impl Dispute {
    pub fn open(
        dispute_number: impl Into<String>,
        employee_id: EmployeeId,
        request: &NewDispute,
        now: DateTime<Utc>,
    ) -> Result<Self, ClaimError> {
        let payslip_reference =
            require_text(request.payslip_reference.as_deref(), "Payslip reference is required")?;
        let description = require_text(
            request.description.as_deref(),
            "Description is required and cannot be empty",
        )?;

        Ok(Self {
            id: DisputeId::new_v7(),
            dispute_number: dispute_number.into(),
            payslip_reference,
            description,
            employee_id,
            review: ReviewState::submitted(now),
            created_at: now,
        })
    }

    pub fn status(&self) -> ReviewStatus {
        self.review.status
    }

    /// Refund amount agreed by the reviewers, if any
    pub fn approved_refund_amount(&self) -> Option<Decimal> {
        self.review.approved_amount
    }

    pub fn resolution_comment(&self) -> Option<String> {
        self.review.decision_log.render(CaseKind::Dispute)
    }
}

impl ReviewCase for Dispute {
    const KIND: CaseKind = CaseKind::Dispute;

    fn source_id(&self) -> Uuid {
        *self.id.as_uuid()
    }

    fn number(&self) -> &str {
        &self.dispute_number
    }

    fn summary(&self) -> &str {
        &self.description
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    fn amount_cap(&self) -> Option<Decimal> {
        None
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
        RefundSource::Dispute(self.id)
    }

    fn resolve_refund_amount(&self, override_amount: Option<Decimal>) -> Result<Decimal, ClaimError> {
        resolve_dispute_refund_amount(&self.review, override_amount)
    }

    fn default_refund_description(&self) -> String {
        format!("Refund for approved dispute {}", self.dispute_number)
    }
}
