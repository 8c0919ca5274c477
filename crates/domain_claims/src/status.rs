//! Review status and case kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a claim or dispute in the review pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    /// Submitted, waiting for a payroll specialist
    UnderReview,
    /// Specialist approved, waiting for a payroll manager
    PendingManagerApproval,
    /// Confirmed by a manager; finance may generate a refund
    Approved,
    /// Rejected by a specialist or a manager
    Rejected,
}

impl ReviewStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::UnderReview => "under_review",
            ReviewStatus::PendingManagerApproval => "pending_manager_approval",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }

    /// Approved and rejected cases accept no further specialist or manager action
    pub fn is_final(&self) -> bool {
        matches!(self, ReviewStatus::Approved | ReviewStatus::Rejected)
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ReviewStatus) -> bool {
        use ReviewStatus::*;
        matches!(
            (self, target),
            (UnderReview, PendingManagerApproval) |
            (UnderReview, Rejected) |
            (PendingManagerApproval, Approved) |
            (PendingManagerApproval, Rejected)
        )
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "under_review" => Ok(ReviewStatus::UnderReview),
            "pending_manager_approval" => Ok(ReviewStatus::PendingManagerApproval),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(format!("Unknown review status: {}", other)),
        }
    }
}

/// Which kind of case is moving through the pipeline
///
/// Claims and disputes share the workflow; the kind only changes wording and
/// whether an upper amount bound exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Claim,
    Dispute,
}

impl CaseKind {
    /// Lower-case noun used inside messages
    pub fn noun(&self) -> &'static str {
        match self {
            CaseKind::Claim => "claim",
            CaseKind::Dispute => "dispute",
        }
    }

    /// Capitalised noun used at the start of messages
    pub fn title(&self) -> &'static str {
        match self {
            CaseKind::Claim => "Claim",
            CaseKind::Dispute => "Dispute",
        }
    }

    /// Name of the amount reviewers set
    pub fn amount_label(&self) -> &'static str {
        match self {
            CaseKind::Claim => "Approved amount",
            CaseKind::Dispute => "Refund amount",
        }
    }

    pub fn proposed_label(&self) -> &'static str {
        match self {
            CaseKind::Claim => "Proposed approved amount",
            CaseKind::Dispute => "Proposed refund amount",
        }
    }

    pub fn final_label(&self) -> &'static str {
        match self {
            CaseKind::Claim => "Final approved amount",
            CaseKind::Dispute => "Final refund amount",
        }
    }
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_is_monotonic() {
        use ReviewStatus::*;
        assert!(UnderReview.can_transition_to(PendingManagerApproval));
        assert!(UnderReview.can_transition_to(Rejected));
        assert!(PendingManagerApproval.can_transition_to(Approved));
        assert!(PendingManagerApproval.can_transition_to(Rejected));

        assert!(!UnderReview.can_transition_to(Approved));
        assert!(!PendingManagerApproval.can_transition_to(UnderReview));
        for target in [UnderReview, PendingManagerApproval, Approved, Rejected] {
            assert!(!Approved.can_transition_to(target));
            assert!(!Rejected.can_transition_to(target));
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            ReviewStatus::UnderReview,
            ReviewStatus::PendingManagerApproval,
            ReviewStatus::Approved,
            ReviewStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ReviewStatus>().unwrap(), status);
        }
        assert!("paid".parse::<ReviewStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&ReviewStatus::PendingManagerApproval).unwrap();
        assert_eq!(json, "\"PENDING_MANAGER_APPROVAL\"");
    }
}
