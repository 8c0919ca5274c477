//! PostgreSQL refund store

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, RefundId};
use domain_claims::{CaseKind, Refund, RefundPort, RefundSource, RefundStatus};

use crate::adapters::ping;
use crate::error::DatabaseError;
use crate::repositories::RefundRepository;

#[derive(Debug, Clone)]
pub struct PostgresRefundAdapter {
    repository: RefundRepository,
    pool: PgPool,
}

impl PostgresRefundAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: RefundRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresRefundAdapter {}

#[async_trait]
impl HealthCheckable for PostgresRefundAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-refund-adapter").await
    }
}

#[async_trait]
impl RefundPort for PostgresRefundAdapter {
    #[instrument(skip(self, refund), fields(refund_id = %refund.id))]
    async fn insert(&self, refund: &Refund) -> Result<(), PortError> {
        self.repository.insert(refund).await.map_err(|e| match e {
            DatabaseError::DuplicateEntry(_) => PortError::conflict(format!(
                "A pending refund already exists for this {}",
                refund.source.kind().noun()
            )),
            other => other.into(),
        })?;
        debug!("Refund inserted");
        Ok(())
    }

    #[instrument(skip(self, refund), fields(refund_id = %refund.id, status = %refund.status))]
    async fn save(&self, refund: &Refund) -> Result<(), PortError> {
        self.repository.update(refund).await?;
        Ok(())
    }

    async fn get(&self, id: RefundId) -> Result<Refund, PortError> {
        let row = self.repository.get(id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => PortError::not_found("Refund", id),
            other => other.into(),
        })?;
        Ok(Refund::try_from(row)?)
    }

    async fn find_for_source(&self, source: RefundSource) -> Result<Vec<Refund>, PortError> {
        let rows = self.repository.find_for_source(source).await?;
        Ok(rows.into_iter().map(Refund::try_from).collect::<Result<Vec<_>, _>>()?)
    }

    async fn sources_with_refunds(&self, kind: CaseKind) -> Result<HashSet<Uuid>, PortError> {
        Ok(self.repository.source_ids(kind).await?.into_iter().collect())
    }

    async fn list_by_status(&self, status: RefundStatus) -> Result<Vec<Refund>, PortError> {
        let rows = self.repository.list_by_status(status).await?;
        Ok(rows.into_iter().map(Refund::try_from).collect::<Result<Vec<_>, _>>()?)
    }
}
