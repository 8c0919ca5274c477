//! Core Kernel - Foundational types shared by every payroll tracking crate
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers for employees, claims, disputes, refunds
//! - System roles and the acting user context
//! - The port error type and marker traits for the ports-and-adapters layout

pub mod identifiers;
pub mod roles;
pub mod ports;
pub mod error;

pub use identifiers::{
    EmployeeId, ClaimId, DisputeId, RefundId, NotificationId, ConversationId,
};
pub use roles::{Actor, SystemRole};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
