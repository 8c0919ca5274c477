//! Test Data Builders
//!
//! Builders that produce claims and disputes already moved to a given point
//! of the review pipeline. Transitions go through the real workflow
//! functions, so a built case is always one the services could have
//! produced. [`TestClaimBuilder::legacy_pending`] is the exception: it
//! fabricates a record that skipped the specialist log entry.

use chrono::Utc;
use core_kernel::EmployeeId;
use domain_claims::review::{apply_manager_decision, apply_specialist_decision};
use domain_claims::{
    Claim, Dispute, NewClaim, NewDispute, ReviewDecision, ReviewStatus, WorkflowPolicy,
};
use rust_decimal::Decimal;

use crate::fixtures::{AmountFixtures, RequestFixtures};

/// How far down the pipeline a built case should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStage {
    UnderReview,
    PendingManagerApproval,
    Approved,
    RejectedBySpecialist,
    RejectedByManager,
    /// Pending manager approval with no specialist entry in the log
    LegacyPending,
}

/// Builder for claims at any review stage
pub struct TestClaimBuilder {
    claim_number: String,
    employee_id: EmployeeId,
    description: String,
    claim_type: String,
    amount: Decimal,
    proposed: Option<Decimal>,
    manager_override: Option<Decimal>,
    stage: TargetStage,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    pub fn new() -> Self {
        Self {
            claim_number: "CLAIM-1".to_string(),
            employee_id: EmployeeId::new(),
            description: RequestFixtures::description(),
            claim_type: "travel".to_string(),
            amount: AmountFixtures::claimed(),
            proposed: Some(AmountFixtures::proposed()),
            manager_override: None,
            stage: TargetStage::UnderReview,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.claim_number = number.into();
        self
    }

    pub fn with_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = employee_id;
        self
    }

    pub fn with_claim_type(mut self, claim_type: impl Into<String>) -> Self {
        self.claim_type = claim_type.into();
        self
    }

    /// Sets the requested amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Amount the specialist proposes when approving
    pub fn with_proposed(mut self, proposed: Option<Decimal>) -> Self {
        self.proposed = proposed;
        self
    }

    /// Amount the manager sets when confirming
    pub fn with_manager_override(mut self, amount: Decimal) -> Self {
        self.manager_override = Some(amount);
        self
    }

    pub fn pending_manager_approval(mut self) -> Self {
        self.stage = TargetStage::PendingManagerApproval;
        self
    }

    pub fn approved(mut self) -> Self {
        self.stage = TargetStage::Approved;
        self
    }

    pub fn rejected_by_specialist(mut self) -> Self {
        self.stage = TargetStage::RejectedBySpecialist;
        self
    }

    pub fn rejected_by_manager(mut self) -> Self {
        self.stage = TargetStage::RejectedByManager;
        self
    }

    /// Status says pending manager approval, but the log has no specialist entry
    pub fn legacy_pending(mut self) -> Self {
        self.stage = TargetStage::LegacyPending;
        self
    }

    pub fn build(self) -> Claim {
        let request = NewClaim {
            description: Some(self.description.clone()),
            claim_type: Some(self.claim_type.clone()),
            amount: Some(self.amount),
            claim_number: None,
        };
        let mut claim = Claim::submit(self.claim_number.clone(), self.employee_id, &request, Utc::now())
            .expect("builder produced an invalid claim");
        advance(&mut claim, self.stage, self.proposed, self.manager_override);
        claim
    }
}

/// Builder for disputes at any review stage
pub struct TestDisputeBuilder {
    dispute_number: String,
    employee_id: EmployeeId,
    payslip_reference: String,
    proposed: Option<Decimal>,
    manager_override: Option<Decimal>,
    stage: TargetStage,
}

impl Default for TestDisputeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDisputeBuilder {
    pub fn new() -> Self {
        Self {
            dispute_number: "DISP-1".to_string(),
            employee_id: EmployeeId::new(),
            payslip_reference: "PAYSLIP-2024-06".to_string(),
            proposed: Some(AmountFixtures::proposed()),
            manager_override: None,
            stage: TargetStage::UnderReview,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.dispute_number = number.into();
        self
    }

    pub fn with_employee(mut self, employee_id: EmployeeId) -> Self {
        self.employee_id = employee_id;
        self
    }

    pub fn with_proposed(mut self, proposed: Option<Decimal>) -> Self {
        self.proposed = proposed;
        self
    }

    pub fn with_manager_override(mut self, amount: Decimal) -> Self {
        self.manager_override = Some(amount);
        self
    }

    pub fn at_stage(mut self, stage: TargetStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn build(self) -> Dispute {
        let request = NewDispute {
            payslip_reference: Some(self.payslip_reference.clone()),
            description: Some(RequestFixtures::description()),
            dispute_number: None,
        };
        let mut dispute = Dispute::open(self.dispute_number.clone(), self.employee_id, &request, Utc::now())
            .expect("builder produced an invalid dispute");
        advance(&mut dispute, self.stage, self.proposed, self.manager_override);
        dispute
    }
}

fn advance<C: domain_claims::ReviewCase>(
    case: &mut C,
    stage: TargetStage,
    proposed: Option<Decimal>,
    manager_override: Option<Decimal>,
) {
    let specialist = EmployeeId::new();
    let manager = EmployeeId::new();
    let policy = WorkflowPolicy::for_claims();
    let now = Utc::now();

    match stage {
        TargetStage::UnderReview => {}
        TargetStage::LegacyPending => {
            let state = case.review_mut();
            state.status = ReviewStatus::PendingManagerApproval;
            state.approved_amount = proposed;
        }
        TargetStage::RejectedBySpecialist => {
            apply_specialist_decision(case, specialist, &ReviewDecision::reject("Missing receipt"), now)
                .expect("specialist rejection failed");
        }
        TargetStage::PendingManagerApproval | TargetStage::Approved | TargetStage::RejectedByManager => {
            apply_specialist_decision(case, specialist, &ReviewDecision::approve(proposed), now)
                .expect("specialist approval failed");

            match stage {
                TargetStage::Approved => {
                    apply_manager_decision(
                        case,
                        manager,
                        &ReviewDecision::approve(manager_override),
                        &policy,
                        now,
                    )
                    .expect("manager confirmation failed");
                }
                TargetStage::RejectedByManager => {
                    apply_manager_decision(
                        case,
                        manager,
                        &ReviewDecision::reject("Over budget"),
                        &policy,
                        now,
                    )
                    .expect("manager rejection failed");
                }
                _ => {}
            }
        }
    }
}
