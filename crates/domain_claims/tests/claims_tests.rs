//! Workflow tests for claims, disputes, and refunds

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::EmployeeId;
use domain_claims::ports::mock::{
    FailingNotifier, MockCasePort, MockRefundPort, NoticeTarget, RecordingNotifier,
};
use domain_claims::review::apply_specialist_decision;
use domain_claims::{
    Claim, ClaimService, DecisionEntry, DecisionStage, Dispute, DisputeService, ErrorKind, NewClaim,
    Refund, RefundDetails, RefundService, RefundSource, RefundStatus, ReviewDecision,
    ReviewEventKind, ReviewNotifier, ReviewStatus, WorkflowPolicy,
};
use test_utils::{
    assert_amount_within_claimed, assert_case_status, assert_claim_status,
    assert_decision_stages, assert_error_kind, assert_error_mentions,
    claimed_and_candidate_strategy, claimed_and_valid_amount_strategy, ActorFixtures,
    RequestFixtures, TargetStage, TestClaimBuilder, TestDisputeBuilder,
};

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    claims: Arc<MockCasePort<Claim>>,
    refunds: Arc<MockRefundPort>,
    notifier: Arc<RecordingNotifier>,
    service: ClaimService,
}

impl Harness {
    async fn with_claims(claims: Vec<Claim>) -> Self {
        Self::build(claims, WorkflowPolicy::for_claims()).await
    }

    async fn build(claims: Vec<Claim>, policy: WorkflowPolicy) -> Self {
        let claims = Arc::new(MockCasePort::with_cases(claims).await);
        let refunds = Arc::new(MockRefundPort::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = ClaimService::new(claims.clone(), refunds.clone(), notifier.clone(), policy);
        Self {
            claims,
            refunds,
            notifier,
            service,
        }
    }

    async fn stored(&self, number: &str) -> Claim {
        use domain_claims::CasePort;
        self.claims
            .find_by_number(number)
            .await
            .unwrap()
            .expect("claim should be stored")
    }
}

fn specialist() -> EmployeeId {
    ActorFixtures::specialist().employee_id
}

fn manager() -> EmployeeId {
    ActorFixtures::manager().employee_id
}

fn finance() -> EmployeeId {
    ActorFixtures::finance_staff().employee_id
}

// ============================================================================
// Creation
// ============================================================================

mod creation_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_claim_generates_sequential_number() {
        let h = Harness::with_claims(vec![]).await;
        let employee = EmployeeId::new();

        let first = h.service.create_claim(employee, RequestFixtures::standard_claim()).await.unwrap();
        let second = h.service.create_claim(employee, RequestFixtures::standard_claim()).await.unwrap();

        assert_eq!(first.claim_number, "CLAIM-1");
        assert_eq!(second.claim_number, "CLAIM-2");
        assert_claim_status(&first, ReviewStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_generated_number_skips_explicit_collision() {
        let h = Harness::with_claims(vec![]).await;
        let employee = EmployeeId::new();

        h.service
            .create_claim(employee, RequestFixtures::standard_claim().with_number("CLAIM-2"))
            .await
            .unwrap();
        let generated = h.service.create_claim(employee, RequestFixtures::standard_claim()).await.unwrap();

        assert_eq!(generated.claim_number, "CLAIM-3");
    }

    #[tokio::test]
    async fn test_duplicate_explicit_number_rejected() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().with_number("TRAVEL-9").build()]).await;

        let err = h
            .service
            .create_claim(EmployeeId::new(), RequestFixtures::standard_claim().with_number("TRAVEL-9"))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Validation);
        assert_eq!(err.to_string(), "A claim with this ID already exists");
    }

    #[tokio::test]
    async fn test_create_claim_validates_fields() {
        let h = Harness::with_claims(vec![]).await;

        let mut request = RequestFixtures::standard_claim();
        request.claim_type = Some("  ".to_string());
        let err = h.service.create_claim(EmployeeId::new(), request).await.unwrap_err();
        assert_error_kind(&err, ErrorKind::Validation);

        let err = h
            .service
            .create_claim(EmployeeId::new(), NewClaim::new("Hotel", "travel", dec!(-5)))
            .await
            .unwrap_err();
        assert_error_kind(&err, ErrorKind::AmountConstraint);

        // Nothing stored, so the next generated number is still the first one
        let created = h.service.create_claim(EmployeeId::new(), RequestFixtures::standard_claim()).await.unwrap();
        assert_eq!(created.claim_number, "CLAIM-1");
    }
}

// ============================================================================
// Specialist review
// ============================================================================

mod specialist_tests {
    use super::*;

    #[tokio::test]
    async fn test_specialist_approval_forwards_to_manager() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;
        let specialist = specialist();

        let claim = h
            .service
            .approve_or_reject_claim(
                "CLAIM-1",
                specialist,
                ReviewDecision::approve(Some(dec!(400))).with_comment("Receipts attached"),
            )
            .await
            .unwrap();

        assert_claim_status(&claim, ReviewStatus::PendingManagerApproval);
        assert_eq!(claim.approved_amount(), Some(dec!(400)));
        assert_eq!(claim.review.payroll_specialist_id, Some(specialist));
        assert_decision_stages(&claim.review.decision_log, &[DecisionStage::SpecialistApproved]);
        assert_eq!(
            claim.resolution_comment().unwrap(),
            "Payroll Specialist: Receipts attached (Proposed approved amount: 400)"
        );

        assert_eq!(h.stored("CLAIM-1").await, claim);
        assert_eq!(h.notifier.events_for(NoticeTarget::Employee).await, vec![ReviewEventKind::UnderReview]);
        assert_eq!(
            h.notifier.events_for(NoticeTarget::PayrollManagers).await,
            vec![ReviewEventKind::UnderReview]
        );
    }

    #[tokio::test]
    async fn test_approval_above_claimed_amount_fails() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().with_amount(dec!(500)).build()]).await;

        let err = h
            .service
            .approve_or_reject_claim("CLAIM-1", specialist(), ReviewDecision::approve(Some(dec!(600))))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::AmountConstraint);
        assert_eq!(err.to_string(), "Approved amount (600) cannot exceed the claimed amount (500).");
        let stored = h.stored("CLAIM-1").await;
        assert_claim_status(&stored, ReviewStatus::UnderReview);
        assert!(stored.review.decision_log.is_empty());
        assert!(h.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_approval_requires_amount() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;

        let err = h
            .service
            .approve_or_reject_claim("CLAIM-1", specialist(), ReviewDecision::approve(None))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::Validation);
        assert_error_mentions(&err, "Approved amount is required");
    }

    #[tokio::test]
    async fn test_rejection_requires_reason() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;

        let err = h
            .service
            .approve_or_reject_claim("CLAIM-1", specialist(), ReviewDecision::reject("   "))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Rejection reason is required when rejecting a claim");
        assert_claim_status(&h.stored("CLAIM-1").await, ReviewStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_specialist_rejection() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;

        let claim = h
            .service
            .approve_or_reject_claim("CLAIM-1", specialist(), ReviewDecision::reject("  No receipt  "))
            .await
            .unwrap();

        assert_claim_status(&claim, ReviewStatus::Rejected);
        assert_eq!(claim.review.rejection_reason.as_deref(), Some("No receipt"));
        assert_eq!(h.notifier.events_for(NoticeTarget::Employee).await, vec![ReviewEventKind::Rejected]);
        assert!(h.notifier.events_for(NoticeTarget::PayrollManagers).await.is_empty());
    }

    #[tokio::test]
    async fn test_second_specialist_review_blocked() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().pending_manager_approval().build()]).await;

        let err = h
            .service
            .approve_or_reject_claim("CLAIM-1", specialist(), ReviewDecision::approve(Some(dec!(100))))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::StateConflict);
        assert_error_mentions(&err, "awaiting manager confirmation");
    }

    #[tokio::test]
    async fn test_unknown_claim() {
        let h = Harness::with_claims(vec![]).await;

        let err = h
            .service
            .approve_or_reject_claim("CLAIM-404", specialist(), ReviewDecision::reject("x"))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::NotFound);
    }
}

// ============================================================================
// Manager review
// ============================================================================

mod manager_tests {
    use super::*;

    #[tokio::test]
    async fn test_manager_confirms_with_proposed_amount() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().pending_manager_approval().build()]).await;

        let claim = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap();

        assert_claim_status(&claim, ReviewStatus::Approved);
        assert_eq!(claim.approved_amount(), Some(dec!(400)));
        assert_eq!(claim.review.decision_log.final_amount(), Some(dec!(400)));

        let sent = h.notifier.sent().await;
        let finance = sent
            .iter()
            .find(|(target, _, _)| *target == NoticeTarget::FinanceStaff)
            .expect("finance staff notified");
        assert_eq!(finance.2, Some(dec!(400)));
        assert_eq!(h.notifier.events_for(NoticeTarget::Employee).await, vec![ReviewEventKind::Approved]);
    }

    #[tokio::test]
    async fn test_manager_override_is_capped() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().pending_manager_approval().build()]).await;

        let err = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(Some(dec!(501))))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::AmountConstraint);
        assert_claim_status(&h.stored("CLAIM-1").await, ReviewStatus::PendingManagerApproval);
    }

    #[tokio::test]
    async fn test_second_manager_confirmation_blocked() {
        let mut claim = TestClaimBuilder::new().pending_manager_approval().build();
        claim.review.decision_log.append(
            DecisionEntry::new(DecisionStage::ManagerConfirmed, Some(manager()), Utc::now())
                .with_amount(Some(dec!(400))),
        );
        let before = claim.clone();
        let h = Harness::with_claims(vec![claim]).await;

        let err = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::StateConflict);
        assert_error_mentions(&err, "already been confirmed");
        assert_eq!(h.stored("CLAIM-1").await, before);
        assert!(h.notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_override_is_kept_and_needs_finance_amount() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().pending_manager_approval().build()]).await;

        let claim = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(Some(Decimal::ZERO)))
            .await
            .unwrap();

        assert_claim_status(&claim, ReviewStatus::Approved);
        assert_eq!(claim.approved_amount(), Some(Decimal::ZERO));
        assert_eq!(claim.review.decision_log.final_amount(), Some(Decimal::ZERO));

        let err = h
            .service
            .generate_refund_for_claim("CLAIM-1", finance(), None, None)
            .await
            .unwrap_err();
        assert_error_kind(&err, ErrorKind::AmountConstraint);
        assert!(h.refunds.all().await.is_empty());

        let refund = h
            .service
            .generate_refund_for_claim("CLAIM-1", finance(), None, Some(dec!(120)))
            .await
            .unwrap();
        assert_eq!(refund.details.amount, dec!(120));
    }

    #[tokio::test]
    async fn test_confirm_requires_pending_status() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;

        let err = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::StateConflict);
        assert_eq!(
            err.to_string(),
            "Claim must be approved by Payroll Specialist before manager confirmation"
        );
    }

    #[tokio::test]
    async fn test_manager_rejection_blocks_refund() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().pending_manager_approval().build()]).await;

        let claim = h
            .service
            .confirm_claim_approval(
                "CLAIM-1",
                manager(),
                ReviewDecision::reject("insufficient documentation"),
            )
            .await
            .unwrap();

        assert_claim_status(&claim, ReviewStatus::Rejected);
        assert_eq!(claim.review.rejection_reason.as_deref(), Some("insufficient documentation"));

        let err = h
            .service
            .generate_refund_for_claim("CLAIM-1", finance(), None, None)
            .await
            .unwrap_err();
        assert_error_kind(&err, ErrorKind::StateConflict);
        assert!(h.refunds.all().await.is_empty());
    }

    #[tokio::test]
    async fn test_manager_reject_wrong_status_reports_current() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;

        let err = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::reject("late"))
            .await
            .unwrap_err();

        assert_error_mentions(&err, "Current status: under_review");
    }

    #[tokio::test]
    async fn test_legacy_pending_claim_is_repaired() {
        let legacy = TestClaimBuilder::new().with_proposed(Some(dec!(300))).legacy_pending().build();
        let h = Harness::with_claims(vec![legacy]).await;

        let claim = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap();

        assert_claim_status(&claim, ReviewStatus::Approved);
        // No proposal in the log, so the stored amount is kept
        assert_eq!(claim.approved_amount(), Some(dec!(300)));
        assert_decision_stages(
            &claim.review.decision_log,
            &[DecisionStage::SpecialistMarkerRepaired, DecisionStage::ManagerConfirmed],
        );
    }

    #[tokio::test]
    async fn test_legacy_pending_claim_fails_when_strict() {
        let legacy = TestClaimBuilder::new().legacy_pending().build();
        let h = Harness::build(vec![legacy], WorkflowPolicy::for_claims().strict(true)).await;

        let err = h
            .service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap_err();

        assert_error_kind(&err, ErrorKind::StateConflict);
        assert_claim_status(&h.stored("CLAIM-1").await, ReviewStatus::PendingManagerApproval);
    }
}

// ============================================================================
// Terminal states
// ============================================================================

mod terminal_state_tests {
    use super::*;

    #[tokio::test]
    async fn test_terminal_claims_accept_no_review_action() {
        let claims = vec![
            TestClaimBuilder::new().with_number("CLAIM-1").approved().build(),
            TestClaimBuilder::new().with_number("CLAIM-2").rejected_by_specialist().build(),
            TestClaimBuilder::new().with_number("CLAIM-3").rejected_by_manager().build(),
        ];
        let h = Harness::with_claims(claims).await;

        for number in ["CLAIM-1", "CLAIM-2", "CLAIM-3"] {
            let before = h.stored(number).await;
            let decisions = [
                ReviewDecision::approve(Some(dec!(10))),
                ReviewDecision::reject("again"),
            ];
            for decision in decisions {
                let err = h
                    .service
                    .approve_or_reject_claim(number, specialist(), decision.clone())
                    .await
                    .unwrap_err();
                assert_error_kind(&err, ErrorKind::StateConflict);

                let err = h
                    .service
                    .confirm_claim_approval(number, manager(), decision)
                    .await
                    .unwrap_err();
                assert_error_kind(&err, ErrorKind::StateConflict);
            }
            assert_eq!(h.stored(number).await, before);
        }
    }
}

// ============================================================================
// Refunds
// ============================================================================

mod refund_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_pipeline_refunds_proposed_amount() {
        let h = Harness::with_claims(vec![]).await;
        let employee = EmployeeId::new();
        let finance_staff = finance();

        let claim = h.service.create_claim(employee, NewClaim::new("Conference", "travel", dec!(500))).await.unwrap();
        h.service
            .approve_or_reject_claim(&claim.claim_number, specialist(), ReviewDecision::approve(Some(dec!(400))))
            .await
            .unwrap();
        h.service
            .confirm_claim_approval(&claim.claim_number, manager(), ReviewDecision::approve(None))
            .await
            .unwrap();
        let refund = h
            .service
            .generate_refund_for_claim(&claim.claim_number, finance_staff, None, None)
            .await
            .unwrap();

        assert_eq!(refund.details.amount, dec!(400));
        assert_eq!(refund.status, RefundStatus::Pending);
        assert_eq!(refund.employee_id, employee);
        assert_eq!(refund.details.description, "Refund for approved expense claim CLAIM-1");

        let stored = h.stored("CLAIM-1").await;
        assert_claim_status(&stored, ReviewStatus::Approved);
        assert_eq!(stored.approved_amount(), Some(dec!(400)));
        assert_eq!(stored.review.finance_staff_id, Some(finance_staff));
    }

    #[tokio::test]
    async fn test_final_amount_beats_proposed() {
        let claim = TestClaimBuilder::new()
            .with_proposed(Some(dec!(100)))
            .with_manager_override(dec!(150))
            .approved()
            .build();
        let h = Harness::with_claims(vec![claim]).await;

        let refund = h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap();

        assert_eq!(refund.details.amount, dec!(150));
    }

    #[tokio::test]
    async fn test_override_supersedes_logged_amounts() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().approved().build()]).await;

        let refund = h
            .service
            .generate_refund_for_claim("CLAIM-1", finance(), Some("Partial".into()), Some(dec!(120)))
            .await
            .unwrap();

        assert_eq!(refund.details.amount, dec!(120));
        assert_eq!(refund.details.description, "Partial");
    }

    #[tokio::test]
    async fn test_refund_requires_approved_claim() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().pending_manager_approval().build()]).await;

        let err = h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap_err();

        assert_error_kind(&err, ErrorKind::StateConflict);
    }

    #[tokio::test]
    async fn test_duplicate_pending_refund_rejected() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().approved().build()]).await;

        h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap();
        let err = h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap_err();

        assert_error_kind(&err, ErrorKind::StateConflict);
        assert_eq!(err.to_string(), "A pending refund already exists for this claim");
        assert_eq!(h.refunds.all().await.len(), 1);
    }

    #[tokio::test]
    async fn test_paid_refund_allows_new_refund() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().approved().build()]).await;
        let refunds = RefundService::new(h.refunds.clone());

        let first = h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap();
        let paid = refunds.mark_refund_paid(first.id, finance()).await.unwrap();
        assert_eq!(paid.status, RefundStatus::Paid);
        assert!(refunds.pending_refunds().await.unwrap().is_empty());

        h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap();
        assert_eq!(refunds.pending_refunds().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_finance_staff_backfilled_from_existing_refund() {
        let claim = TestClaimBuilder::new().approved().build();
        let earlier_staff = finance();
        let existing = Refund::pending(
            RefundSource::Claim(claim.id),
            claim.employee_id,
            Some(earlier_staff),
            RefundDetails {
                description: "earlier".into(),
                amount: dec!(400),
            },
            Utc::now(),
        );
        let h = Harness::with_claims(vec![claim]).await;
        use domain_claims::RefundPort;
        h.refunds.insert(&existing).await.unwrap();

        let err = h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap_err();

        // The duplicate guard still fires, but the backfill was persisted first
        assert_error_kind(&err, ErrorKind::StateConflict);
        assert_eq!(h.stored("CLAIM-1").await.review.finance_staff_id, Some(earlier_staff));
    }

    #[tokio::test]
    async fn test_approved_claims_awaiting_refund() {
        let claims = vec![
            TestClaimBuilder::new().with_number("CLAIM-1").approved().build(),
            TestClaimBuilder::new().with_number("CLAIM-2").approved().build(),
            TestClaimBuilder::new().with_number("CLAIM-3").build(),
        ];
        let h = Harness::with_claims(claims).await;

        h.service.generate_refund_for_claim("CLAIM-1", finance(), None, None).await.unwrap();
        let awaiting = h.service.approved_claims_awaiting_refund().await.unwrap();

        let numbers: Vec<_> = awaiting.iter().map(|c| c.claim_number.as_str()).collect();
        assert_eq!(numbers, vec!["CLAIM-2"]);
    }

    #[tokio::test]
    async fn test_mark_unknown_refund() {
        let refunds = RefundService::new(Arc::new(MockRefundPort::new()));
        let err = refunds
            .mark_refund_paid(core_kernel::RefundId::new(), finance())
            .await
            .unwrap_err();
        assert_error_kind(&err, ErrorKind::NotFound);
    }
}

// ============================================================================
// Queries
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_visibility() {
        let owner = ActorFixtures::employee();
        let claim = TestClaimBuilder::new().with_employee(owner.employee_id).build();
        let h = Harness::with_claims(vec![claim]).await;

        assert!(h.service.get_claim("CLAIM-1", &owner).await.is_ok());
        assert!(h.service.get_claim("CLAIM-1", &ActorFixtures::specialist()).await.is_ok());
        assert!(h.service.get_claim("CLAIM-1", &ActorFixtures::finance_staff()).await.is_ok());

        let err = h.service.get_claim("CLAIM-1", &ActorFixtures::employee()).await.unwrap_err();
        assert_error_kind(&err, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_lookup_trims_number() {
        let h = Harness::with_claims(vec![TestClaimBuilder::new().build()]).await;

        let claim = h.service.get_claim("  CLAIM-1 ", &ActorFixtures::specialist()).await.unwrap();
        assert_eq!(claim.claim_number, "CLAIM-1");

        let claim = h
            .service
            .approve_or_reject_claim(" CLAIM-1", specialist(), ReviewDecision::approve(Some(dec!(400))))
            .await
            .unwrap();
        assert_claim_status(&claim, ReviewStatus::PendingManagerApproval);
    }

    #[tokio::test]
    async fn test_queues_by_status() {
        let claims = vec![
            TestClaimBuilder::new().with_number("CLAIM-1").build(),
            TestClaimBuilder::new().with_number("CLAIM-2").pending_manager_approval().build(),
            TestClaimBuilder::new().with_number("CLAIM-3").build(),
        ];
        let h = Harness::with_claims(claims).await;

        assert_eq!(h.service.claims_under_review().await.unwrap().len(), 2);
        let pending = h.service.claims_pending_manager_approval().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].claim_number, "CLAIM-2");
    }
}

// ============================================================================
// Notifications
// ============================================================================

mod notification_tests {
    use super::*;

    #[tokio::test]
    async fn test_notification_failure_does_not_abort_transition() {
        let claims = Arc::new(MockCasePort::with_cases(vec![TestClaimBuilder::new().build()]).await);
        let notifier: Arc<dyn ReviewNotifier> = Arc::new(FailingNotifier);
        let service = ClaimService::new(
            claims.clone(),
            Arc::new(MockRefundPort::new()),
            notifier,
            WorkflowPolicy::for_claims(),
        );

        let claim = service
            .approve_or_reject_claim("CLAIM-1", specialist(), ReviewDecision::approve(Some(dec!(50))))
            .await
            .unwrap();
        assert_claim_status(&claim, ReviewStatus::PendingManagerApproval);

        let claim = service
            .confirm_claim_approval("CLAIM-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap();
        assert_claim_status(&claim, ReviewStatus::Approved);
    }
}

// ============================================================================
// Disputes
// ============================================================================

mod dispute_tests {
    use super::*;

    async fn dispute_service(disputes: Vec<Dispute>) -> (DisputeService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let service = DisputeService::new(
            Arc::new(MockCasePort::with_cases(disputes).await),
            Arc::new(MockRefundPort::new()),
            notifier.clone(),
            WorkflowPolicy::for_disputes(),
        );
        (service, notifier)
    }

    #[tokio::test]
    async fn test_create_dispute_numbering() {
        let (service, _) = dispute_service(vec![]).await;

        let dispute = service.create_dispute(EmployeeId::new(), RequestFixtures::new_dispute()).await.unwrap();

        assert_eq!(dispute.dispute_number, "DISP-1");
        assert_case_status(&dispute, ReviewStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_dispute_amounts_are_uncapped() {
        let (service, _) = dispute_service(vec![TestDisputeBuilder::new().build()]).await;

        let dispute = service
            .approve_or_reject_dispute("DISP-1", specialist(), ReviewDecision::approve(Some(dec!(25000))))
            .await
            .unwrap();
        assert_eq!(dispute.approved_refund_amount(), Some(dec!(25000)));

        let err = service
            .confirm_dispute_approval("DISP-1", manager(), ReviewDecision::approve(Some(dec!(-1))))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Refund amount cannot be negative");
    }

    #[tokio::test]
    async fn test_dispute_refund_uses_final_amount() {
        let dispute = TestDisputeBuilder::new()
            .with_manager_override(dec!(75))
            .at_stage(TargetStage::Approved)
            .build();
        let (service, notifier) = dispute_service(vec![dispute]).await;

        let refund = service.generate_refund_for_dispute("DISP-1", finance(), None, None).await.unwrap();

        assert_eq!(refund.details.amount, dec!(75));
        assert!(matches!(refund.source, RefundSource::Dispute(_)));
        assert_eq!(refund.details.description, "Refund for approved dispute DISP-1");
        assert!(notifier.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_dispute_refund_without_amount_fails() {
        let mut dispute = TestDisputeBuilder::new()
            .with_proposed(None)
            .at_stage(TargetStage::LegacyPending)
            .build();
        dispute.review.approved_amount = None;
        let (service, _) = dispute_service(vec![dispute]).await;

        service
            .confirm_dispute_approval("DISP-1", manager(), ReviewDecision::approve(None))
            .await
            .unwrap();
        let err = service.generate_refund_for_dispute("DISP-1", finance(), None, None).await.unwrap_err();

        assert_error_kind(&err, ErrorKind::AmountConstraint);
        assert_error_mentions(&err, "No valid refund amount found");
    }
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #[test]
    fn prop_specialist_amount_never_exceeds_claim((claimed, candidate) in claimed_and_candidate_strategy()) {
        let mut claim = TestClaimBuilder::new().with_amount(claimed).build();
        let result = apply_specialist_decision(
            &mut claim,
            EmployeeId::new(),
            &ReviewDecision::approve(Some(candidate)),
            Utc::now(),
        );

        if candidate < Decimal::ZERO || candidate > claimed {
            prop_assert!(result.is_err());
            prop_assert_eq!(claim.status(), ReviewStatus::UnderReview);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(claim.approved_amount(), Some(candidate));
        }
        assert_amount_within_claimed(&claim);
    }

    #[test]
    fn prop_approved_amount_within_claim_after_confirmation((claimed, amount) in claimed_and_valid_amount_strategy()) {
        let claim = TestClaimBuilder::new()
            .with_amount(claimed)
            .with_proposed(Some(amount))
            .approved()
            .build();

        prop_assert_eq!(claim.approved_amount(), Some(amount));
        assert_amount_within_claimed(&claim);
    }
}
