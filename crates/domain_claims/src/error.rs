//! Payroll tracking domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the claims, disputes, and refunds workflow
///
/// Messages are written for the person who triggered the action and name
/// the constraint that failed.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// The referenced claim, dispute, or refund does not exist
    #[error("{entity} not found: {reference}")]
    NotFound {
        entity: &'static str,
        reference: String,
    },

    /// The action is incompatible with the current status
    #[error("{0}")]
    InvalidState(String),

    /// An amount is negative, exceeds the claimed amount, or cannot be resolved
    #[error("{0}")]
    AmountConstraint(String),

    /// Storage failure
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Error classes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StateConflict,
    AmountConstraint,
    Infrastructure,
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ClaimError::InvalidState(message.into())
    }

    pub fn amount(message: impl Into<String>) -> Self {
        ClaimError::AmountConstraint(message.into())
    }

    pub fn not_found(entity: &'static str, reference: impl Into<String>) -> Self {
        ClaimError::NotFound {
            entity,
            reference: reference.into(),
        }
    }

    /// Classifies the error for the API layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClaimError::Validation(_) => ErrorKind::Validation,
            ClaimError::NotFound { .. } => ErrorKind::NotFound,
            ClaimError::InvalidState(_) => ErrorKind::StateConflict,
            ClaimError::AmountConstraint(_) => ErrorKind::AmountConstraint,
            ClaimError::Port(PortError::NotFound { .. }) => ErrorKind::NotFound,
            ClaimError::Port(PortError::Validation { .. }) => ErrorKind::Validation,
            ClaimError::Port(PortError::Conflict { .. }) => ErrorKind::StateConflict,
            ClaimError::Port(_) => ErrorKind::Infrastructure,
        }
    }
}
