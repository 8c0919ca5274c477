//! PostgreSQL claim and dispute stores

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_claims::{CasePort, CaseQuery, Claim, Dispute};

use crate::adapters::ping;
use crate::repositories::{ClaimRepository, DisputeRepository};

#[derive(Debug, Clone)]
pub struct PostgresClaimAdapter {
    repository: ClaimRepository,
    pool: PgPool,
}

impl PostgresClaimAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresClaimAdapter {}

#[async_trait]
impl HealthCheckable for PostgresClaimAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-claim-adapter").await
    }
}

#[async_trait]
impl CasePort<Claim> for PostgresClaimAdapter {
    #[instrument(skip(self))]
    async fn find_by_number(&self, number: &str) -> Result<Option<Claim>, PortError> {
        let row = self.repository.find_by_number(number).await?;
        Ok(row.map(Claim::try_from).transpose()?)
    }

    async fn number_exists(&self, number: &str) -> Result<bool, PortError> {
        Ok(self.repository.number_exists(number).await?)
    }

    async fn count(&self) -> Result<u64, PortError> {
        let count = self.repository.count().await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self, case), fields(claim_number = %case.claim_number))]
    async fn insert(&self, case: &Claim) -> Result<(), PortError> {
        self.repository.insert(case).await?;
        debug!("Claim inserted");
        Ok(())
    }

    #[instrument(skip(self, case), fields(claim_number = %case.claim_number, status = %case.status()))]
    async fn save(&self, case: &Claim) -> Result<(), PortError> {
        self.repository.update_review(case).await?;
        debug!("Claim updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: CaseQuery) -> Result<Vec<Claim>, PortError> {
        let rows = self.repository.list(query.status, query.employee_id).await?;
        let claims = rows.into_iter().map(Claim::try_from).collect::<Result<Vec<_>, _>>()?;
        debug!(count = claims.len(), "Claims listed");
        Ok(claims)
    }
}

#[derive(Debug, Clone)]
pub struct PostgresDisputeAdapter {
    repository: DisputeRepository,
    pool: PgPool,
}

impl PostgresDisputeAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DisputeRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresDisputeAdapter {}

#[async_trait]
impl HealthCheckable for PostgresDisputeAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, "postgres-dispute-adapter").await
    }
}

#[async_trait]
impl CasePort<Dispute> for PostgresDisputeAdapter {
    #[instrument(skip(self))]
    async fn find_by_number(&self, number: &str) -> Result<Option<Dispute>, PortError> {
        let row = self.repository.find_by_number(number).await?;
        Ok(row.map(Dispute::try_from).transpose()?)
    }

    async fn number_exists(&self, number: &str) -> Result<bool, PortError> {
        Ok(self.repository.number_exists(number).await?)
    }

    async fn count(&self) -> Result<u64, PortError> {
        let count = self.repository.count().await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    #[instrument(skip(self, case), fields(dispute_number = %case.dispute_number))]
    async fn insert(&self, case: &Dispute) -> Result<(), PortError> {
        self.repository.insert(case).await?;
        debug!("Dispute inserted");
        Ok(())
    }

    #[instrument(skip(self, case), fields(dispute_number = %case.dispute_number, status = %case.status()))]
    async fn save(&self, case: &Dispute) -> Result<(), PortError> {
        self.repository.update_review(case).await?;
        debug!("Dispute updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: CaseQuery) -> Result<Vec<Dispute>, PortError> {
        let rows = self.repository.list(query.status, query.employee_id).await?;
        Ok(rows.into_iter().map(Dispute::try_from).collect::<Result<Vec<_>, _>>()?)
    }
}
