//! SQL access per table
//!
//! Repositories own the queries and row types; the adapters in
//! [`crate::adapters`] turn rows into domain models behind the ports.
//! Queries are checked at runtime (`query_as::<_, Row>`), so building the
//! workspace needs no live database.

pub mod cases;
pub mod refunds;
pub mod notifications;
pub mod conversations;

pub use cases::{ClaimRepository, DisputeRepository};
pub use refunds::RefundRepository;
pub use notifications::{EmployeeRoleRepository, NotificationRepository};
pub use conversations::ConversationRepository;
