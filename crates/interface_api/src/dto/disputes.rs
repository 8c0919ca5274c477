//! Disputes DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::{DecisionEntry, Dispute, NewDispute};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDisputeRequest {
    #[validate(length(max = 100, message = "Payslip reference must be at most 100 characters"))]
    pub payslip_reference: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 64, message = "Dispute number must be at most 64 characters"))]
    pub dispute_number: Option<String>,
}

impl From<CreateDisputeRequest> for NewDispute {
    fn from(request: CreateDisputeRequest) -> Self {
        NewDispute {
            payslip_reference: request.payslip_reference,
            description: request.description,
            dispute_number: request.dispute_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DisputeResponse {
    pub id: Uuid,
    pub dispute_number: String,
    pub payslip_reference: String,
    pub description: String,
    pub employee_id: Uuid,
    pub approved_refund_amount: Option<Decimal>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub resolution_comment: Option<String>,
    pub decision_log: Vec<DecisionEntry>,
    pub payroll_specialist_id: Option<Uuid>,
    pub payroll_manager_id: Option<Uuid>,
    pub finance_staff_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Dispute> for DisputeResponse {
    fn from(dispute: Dispute) -> Self {
        let resolution_comment = dispute.resolution_comment();
        let review = dispute.review;
        Self {
            id: *dispute.id.as_uuid(),
            dispute_number: dispute.dispute_number,
            payslip_reference: dispute.payslip_reference,
            description: dispute.description,
            employee_id: *dispute.employee_id.as_uuid(),
            approved_refund_amount: review.approved_amount,
            status: review.status.as_str().to_string(),
            rejection_reason: review.rejection_reason,
            resolution_comment,
            decision_log: review.decision_log.entries().to_vec(),
            payroll_specialist_id: review.payroll_specialist_id.map(|id| *id.as_uuid()),
            payroll_manager_id: review.payroll_manager_id.map(|id| *id.as_uuid()),
            finance_staff_id: review.finance_staff_id.map(|id| *id.as_uuid()),
            created_at: dispute.created_at,
            updated_at: review.updated_at,
        }
    }
}
