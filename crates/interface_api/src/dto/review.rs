//! Review and refund DTOs shared by claims and disputes

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{ClaimError, Refund, RefundSource, ReviewAction, ReviewDecision};

use crate::error::ApiError;

/// Specialist or manager verdict
///
/// `approved_amount` is the proposed amount at the specialist step and the
/// optional final override at the manager step.
#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub action: String,
    pub approved_amount: Option<Decimal>,
    #[validate(length(max = 1000, message = "Rejection reason must be at most 1000 characters"))]
    pub rejection_reason: Option<String>,
    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

impl ReviewRequest {
    pub fn into_decision(self) -> Result<ReviewDecision, ClaimError> {
        let action: ReviewAction = self.action.parse()?;
        Ok(ReviewDecision {
            action,
            amount: self.approved_amount,
            rejection_reason: self.rejection_reason,
            comment: self.comment,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenerateRefundRequest {
    #[validate(length(max = 500, message = "Refund description must be at most 500 characters"))]
    pub description: Option<String>,
    /// Replaces the amount resolved from the decision log
    pub amount: Option<Decimal>,
}

impl GenerateRefundRequest {
    /// Parses the raw refund body
    ///
    /// Only an empty body means "no override". Anything else must be a valid
    /// request, so a malformed amount is rejected instead of ignored.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| ApiError::Validation(format!("Invalid refund request: {}", e)))?;
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Serialize)]
pub struct RefundResponse {
    pub id: Uuid,
    pub source_type: String,
    pub source_id: Uuid,
    pub employee_id: Uuid,
    pub finance_staff_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Refund> for RefundResponse {
    fn from(refund: Refund) -> Self {
        let source_type = match refund.source {
            RefundSource::Claim(_) => "claim",
            RefundSource::Dispute(_) => "dispute",
        };
        Self {
            id: *refund.id.as_uuid(),
            source_type: source_type.to_string(),
            source_id: refund.source.source_uuid(),
            employee_id: *refund.employee_id.as_uuid(),
            finance_staff_id: refund.finance_staff_id.map(|id| *id.as_uuid()),
            description: refund.details.description,
            amount: refund.details.amount,
            status: refund.status.as_str().to_string(),
            paid_at: refund.paid_at,
            created_at: refund.created_at,
            updated_at: refund.updated_at,
        }
    }
}
