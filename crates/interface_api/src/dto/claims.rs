//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{Claim, DecisionEntry, NewClaim};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 100, message = "Claim type must be at most 100 characters"))]
    pub claim_type: Option<String>,
    pub amount: Option<Decimal>,
    #[validate(length(max = 64, message = "Claim number must be at most 64 characters"))]
    pub claim_number: Option<String>,
}

impl From<CreateClaimRequest> for NewClaim {
    fn from(request: CreateClaimRequest) -> Self {
        NewClaim {
            description: request.description,
            claim_type: request.claim_type,
            amount: request.amount,
            claim_number: request.claim_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub claim_number: String,
    pub description: String,
    pub claim_type: String,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub approved_amount: Option<Decimal>,
    pub status: String,
    pub rejection_reason: Option<String>,
    /// Human-readable rendering of the decision log
    pub resolution_comment: Option<String>,
    pub decision_log: Vec<DecisionEntry>,
    pub payroll_specialist_id: Option<Uuid>,
    pub payroll_manager_id: Option<Uuid>,
    pub finance_staff_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        let resolution_comment = claim.resolution_comment();
        let review = claim.review;
        Self {
            id: *claim.id.as_uuid(),
            claim_number: claim.claim_number,
            description: claim.description,
            claim_type: claim.claim_type,
            employee_id: *claim.employee_id.as_uuid(),
            amount: claim.amount,
            approved_amount: review.approved_amount,
            status: review.status.as_str().to_string(),
            rejection_reason: review.rejection_reason,
            resolution_comment,
            decision_log: review.decision_log.entries().to_vec(),
            payroll_specialist_id: review.payroll_specialist_id.map(|id| *id.as_uuid()),
            payroll_manager_id: review.payroll_manager_id.map(|id| *id.as_uuid()),
            finance_staff_id: review.finance_staff_id.map(|id| *id.as_uuid()),
            created_at: claim.created_at,
            updated_at: review.updated_at,
        }
    }
}
