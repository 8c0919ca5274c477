//! Custom Test Assertions
//!
//! Assertion helpers for review cases that print the relevant state when
//! they fail.

use domain_claims::{
    Claim, ClaimError, DecisionLog, DecisionStage, ErrorKind, ReviewCase, ReviewStatus,
};

/// Asserts that a claim is in the expected status
pub fn assert_claim_status(claim: &Claim, expected: ReviewStatus) {
    assert_eq!(
        claim.status(),
        expected,
        "Claim {} has status {}, expected {}",
        claim.claim_number,
        claim.status(),
        expected
    );
}

/// Asserts the status of any claim or dispute
pub fn assert_case_status<C: ReviewCase>(case: &C, expected: ReviewStatus) {
    assert_eq!(
        case.status(),
        expected,
        "{} {} has status {}, expected {}",
        C::KIND.title(),
        case.number(),
        case.status(),
        expected
    );
}

/// Asserts that the approved amount, when set, does not exceed the claim
pub fn assert_amount_within_claimed(claim: &Claim) {
    if let Some(approved) = claim.approved_amount() {
        assert!(
            approved <= claim.amount,
            "Claim {} approved amount {} exceeds claimed amount {}",
            claim.claim_number,
            approved,
            claim.amount
        );
    }
}

/// Asserts that an error falls into the expected class
pub fn assert_error_kind(error: &ClaimError, expected: ErrorKind) {
    assert_eq!(
        error.kind(),
        expected,
        "Expected {:?} error, got {:?}: {}",
        expected,
        error.kind(),
        error
    );
}

/// Asserts that an error message mentions a fragment
pub fn assert_error_mentions(error: &ClaimError, fragment: &str) {
    let message = error.to_string();
    assert!(
        message.contains(fragment),
        "Expected error message to contain {:?}, got {:?}",
        fragment,
        message
    );
}

/// Asserts the exact sequence of stages recorded in a decision log
pub fn assert_decision_stages(log: &DecisionLog, expected: &[DecisionStage]) {
    let actual: Vec<DecisionStage> = log.entries().iter().map(|e| e.stage).collect();
    assert_eq!(actual, expected, "Unexpected decision log stages");
}
