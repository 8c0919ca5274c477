//! Kernel errors

use thiserror::Error;

/// Errors raised while interpreting kernel types from outside input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A role name that maps to no [`crate::SystemRole`]
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
