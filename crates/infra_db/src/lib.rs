//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the payroll tracking ports:
//!
//! | Port | Adapter | Table |
//! |---|---|---|
//! | `CasePort<Claim>` | [`PostgresClaimAdapter`] | `claims` |
//! | `CasePort<Dispute>` | [`PostgresDisputeAdapter`] | `disputes` |
//! | `RefundPort` | [`PostgresRefundAdapter`] | `refunds` |
//! | `NotificationPort` | [`PostgresNotificationAdapter`] | `notifications` |
//! | `RoleDirectory` | [`PostgresRoleDirectory`] | `employee_roles` |
//! | `ConversationPort` | [`PostgresConversationAdapter`] | `conversations` |
//!
//! Decision logs and conversation messages are stored as `JSONB`.
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/payroll")).await?;
//! run_migrations(&pool).await?;
//! let claims = PostgresClaimAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{
    PostgresClaimAdapter, PostgresConversationAdapter, PostgresDisputeAdapter, PostgresNotificationAdapter,
    PostgresRefundAdapter, PostgresRoleDirectory,
};
