//! Port implementations backed by PostgreSQL
//!
//! Each adapter wraps a repository, converts rows into domain models and
//! translates `DatabaseError` into `PortError`.

pub mod cases;
pub mod refunds;
pub mod notifications;
pub mod conversations;

pub use cases::{PostgresClaimAdapter, PostgresDisputeAdapter};
pub use refunds::PostgresRefundAdapter;
pub use notifications::{PostgresNotificationAdapter, PostgresRoleDirectory};
pub use conversations::PostgresConversationAdapter;

use std::time::Instant;

use chrono::Utc;
use sqlx::PgPool;

use core_kernel::{AdapterHealth, HealthCheckResult};

/// Runs `SELECT 1` and reports latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };
    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}
