//! Refund table

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{ClaimId, DisputeId, EmployeeId, RefundId};
use domain_claims::{CaseKind, Refund, RefundDetails, RefundSource, RefundStatus};

use crate::error::DatabaseError;

const REFUND_COLUMNS: &str = "id, source_type, source_id, employee_id, finance_staff_id, description, \
     amount, status, paid_at, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct RefundRow {
    pub id: Uuid,
    pub source_type: String,
    pub source_id: Uuid,
    pub employee_id: Uuid,
    pub finance_staff_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RefundRow> for Refund {
    type Error = DatabaseError;

    fn try_from(row: RefundRow) -> Result<Self, Self::Error> {
        let source = match row.source_type.as_str() {
            "claim" => RefundSource::Claim(ClaimId::from_uuid(row.source_id)),
            "dispute" => RefundSource::Dispute(DisputeId::from_uuid(row.source_id)),
            other => return Err(DatabaseError::corrupt("source_type", other)),
        };
        let status = row
            .status
            .parse::<RefundStatus>()
            .map_err(|_| DatabaseError::corrupt("status", &row.status))?;
        Ok(Refund {
            id: RefundId::from_uuid(row.id),
            source,
            employee_id: EmployeeId::from_uuid(row.employee_id),
            finance_staff_id: row.finance_staff_id.map(EmployeeId::from_uuid),
            details: RefundDetails {
                description: row.description,
                amount: row.amount,
            },
            status,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for the `refunds` table
#[derive(Debug, Clone)]
pub struct RefundRepository {
    pool: PgPool,
}

impl RefundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The partial unique index rejects a second pending refund per source
    pub async fn insert(&self, refund: &Refund) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO refunds (
                id, source_type, source_id, employee_id, finance_staff_id,
                description, amount, status, paid_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(*refund.id.as_uuid())
        .bind(refund.source.kind().noun())
        .bind(refund.source.source_uuid())
        .bind(*refund.employee_id.as_uuid())
        .bind(refund.finance_staff_id.map(Uuid::from))
        .bind(&refund.details.description)
        .bind(refund.details.amount)
        .bind(refund.status.as_str())
        .bind(refund.paid_at)
        .bind(refund.created_at)
        .bind(refund.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update(&self, refund: &Refund) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE refunds SET
                finance_staff_id = $2, description = $3, amount = $4,
                status = $5, paid_at = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*refund.id.as_uuid())
        .bind(refund.finance_staff_id.map(Uuid::from))
        .bind(&refund.details.description)
        .bind(refund.details.amount)
        .bind(refund.status.as_str())
        .bind(refund.paid_at)
        .bind(refund.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Refund", refund.id));
        }
        Ok(())
    }

    pub async fn get(&self, id: RefundId) -> Result<RefundRow, DatabaseError> {
        let sql = format!("SELECT {} FROM refunds WHERE id = $1", REFUND_COLUMNS);
        sqlx::query_as::<_, RefundRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Refund", id))
    }

    pub async fn find_for_source(&self, source: RefundSource) -> Result<Vec<RefundRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM refunds WHERE source_type = $1 AND source_id = $2 ORDER BY created_at",
            REFUND_COLUMNS
        );
        let rows = sqlx::query_as::<_, RefundRow>(&sql)
            .bind(source.kind().noun())
            .bind(source.source_uuid())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn source_ids(&self, kind: CaseKind) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT DISTINCT source_id FROM refunds WHERE source_type = $1")
            .bind(kind.noun())
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    pub async fn list_by_status(&self, status: RefundStatus) -> Result<Vec<RefundRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM refunds WHERE status = $1 ORDER BY created_at",
            REFUND_COLUMNS
        );
        let rows = sqlx::query_as::<_, RefundRow>(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
