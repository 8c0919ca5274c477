//! Payroll Tracking Domain
//!
//! This crate implements the reimbursement pipeline for expense claims and
//! payslip disputes, from submission through two-person review to refund.
//!
//! # Review Lifecycle
//!
//! ```text
//! UNDER_REVIEW --specialist approve--> PENDING_MANAGER_APPROVAL --manager confirm--> APPROVED --finance--> Refund (PENDING)
//!      |                                        |
//!      +--specialist reject--> REJECTED <--manager reject--+
//! ```
//!
//! Every decision is appended to a structured [`DecisionLog`]; the amount a
//! refund pays out is resolved from that log rather than from free text.

pub mod status;
pub mod decision_log;
pub mod validation;
pub mod review;
pub mod claim;
pub mod dispute;
pub mod refund;
pub mod numbering;
pub mod ports;
pub mod services;
pub mod error;

pub use status::{ReviewStatus, CaseKind};
pub use decision_log::{DecisionLog, DecisionEntry, DecisionStage};
pub use review::{ReviewCase, ReviewState, ReviewAction, ReviewDecision, ReviewOutcome, WorkflowPolicy};
pub use claim::{Claim, NewClaim};
pub use dispute::{Dispute, NewDispute};
pub use refund::{Refund, RefundDetails, RefundSource, RefundStatus};
pub use ports::{
    CasePort, ClaimPort, DisputePort, CaseQuery, RefundPort,
    ReviewNotifier, ReviewNotice, ReviewEventKind,
};
pub use services::{ReviewService, ClaimService, DisputeService, RefundService};
pub use error::{ClaimError, ErrorKind};
