//! Claim and dispute tables
//!
//! Both tables carry the same review columns; [`ReviewColumns`] maps them
//! in one place and is flattened into each row type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use core_kernel::{ClaimId, DisputeId, EmployeeId};
use domain_claims::{Claim, DecisionLog, Dispute, ReviewState, ReviewStatus};

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "id, claim_number, description, claim_type, employee_id, amount, \
     approved_amount, status, decision_log, rejection_reason, payroll_specialist_id, \
     payroll_manager_id, finance_staff_id, created_at, updated_at";

const DISPUTE_COLUMNS: &str = "id, dispute_number, payslip_reference, description, employee_id, \
     approved_amount, status, decision_log, rejection_reason, payroll_specialist_id, \
     payroll_manager_id, finance_staff_id, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct ReviewColumns {
    pub status: String,
    pub approved_amount: Option<Decimal>,
    pub decision_log: Json<DecisionLog>,
    pub rejection_reason: Option<String>,
    pub payroll_specialist_id: Option<Uuid>,
    pub payroll_manager_id: Option<Uuid>,
    pub finance_staff_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl ReviewColumns {
    fn into_state(self) -> Result<ReviewState, DatabaseError> {
        let status = self
            .status
            .parse::<ReviewStatus>()
            .map_err(|_| DatabaseError::corrupt("status", &self.status))?;
        Ok(ReviewState {
            status,
            approved_amount: self.approved_amount,
            decision_log: self.decision_log.0,
            rejection_reason: self.rejection_reason,
            payroll_specialist_id: self.payroll_specialist_id.map(EmployeeId::from_uuid),
            payroll_manager_id: self.payroll_manager_id.map(EmployeeId::from_uuid),
            finance_staff_id: self.finance_staff_id.map(EmployeeId::from_uuid),
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub claim_number: String,
    pub description: String,
    pub claim_type: String,
    pub employee_id: Uuid,
    pub amount: Decimal,
    #[sqlx(flatten)]
    pub review: ReviewColumns,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        Ok(Claim {
            id: ClaimId::from_uuid(row.id),
            claim_number: row.claim_number,
            description: row.description,
            claim_type: row.claim_type,
            employee_id: EmployeeId::from_uuid(row.employee_id),
            amount: row.amount,
            review: row.review.into_state()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DisputeRow {
    pub id: Uuid,
    pub dispute_number: String,
    pub payslip_reference: String,
    pub description: String,
    pub employee_id: Uuid,
    #[sqlx(flatten)]
    pub review: ReviewColumns,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DisputeRow> for Dispute {
    type Error = DatabaseError;

    fn try_from(row: DisputeRow) -> Result<Self, Self::Error> {
        Ok(Dispute {
            id: DisputeId::from_uuid(row.id),
            dispute_number: row.dispute_number,
            payslip_reference: row.payslip_reference,
            description: row.description,
            employee_id: EmployeeId::from_uuid(row.employee_id),
            review: row.review.into_state()?,
            created_at: row.created_at,
        })
    }
}

/// Column values written on every review update
struct ReviewBinds<'a> {
    status: &'static str,
    approved_amount: Option<Decimal>,
    decision_log: Json<&'a DecisionLog>,
    rejection_reason: Option<&'a str>,
    payroll_specialist_id: Option<Uuid>,
    payroll_manager_id: Option<Uuid>,
    finance_staff_id: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a ReviewState> for ReviewBinds<'a> {
    fn from(state: &'a ReviewState) -> Self {
        Self {
            status: state.status.as_str(),
            approved_amount: state.approved_amount,
            decision_log: Json(&state.decision_log),
            rejection_reason: state.rejection_reason.as_deref(),
            payroll_specialist_id: state.payroll_specialist_id.map(Uuid::from),
            payroll_manager_id: state.payroll_manager_id.map(Uuid::from),
            finance_staff_id: state.finance_staff_id.map(Uuid::from),
            updated_at: state.updated_at,
        }
    }
}

/// Repository for the `claims` table
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_number(&self, claim_number: &str) -> Result<Option<ClaimRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM claims WHERE claim_number = $1", CLAIM_COLUMNS);
        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn number_exists(&self, claim_number: &str) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM claims WHERE claim_number = $1)")
            .bind(claim_number)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let review = ReviewBinds::from(&claim.review);
        sqlx::query(
            r#"
            INSERT INTO claims (
                id, claim_number, description, claim_type, employee_id, amount,
                approved_amount, status, decision_log, rejection_reason,
                payroll_specialist_id, payroll_manager_id, finance_staff_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(&claim.claim_number)
        .bind(&claim.description)
        .bind(&claim.claim_type)
        .bind(*claim.employee_id.as_uuid())
        .bind(claim.amount)
        .bind(review.approved_amount)
        .bind(review.status)
        .bind(review.decision_log)
        .bind(review.rejection_reason)
        .bind(review.payroll_specialist_id)
        .bind(review.payroll_manager_id)
        .bind(review.finance_staff_id)
        .bind(claim.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::DuplicateEntry(_) => {
                DatabaseError::duplicate("Claim", "claim_number", &claim.claim_number)
            }
            other => other,
        })?;
        Ok(())
    }

    pub async fn update_review(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let review = ReviewBinds::from(&claim.review);
        let result = sqlx::query(
            r#"
            UPDATE claims SET
                approved_amount = $2, status = $3, decision_log = $4, rejection_reason = $5,
                payroll_specialist_id = $6, payroll_manager_id = $7, finance_staff_id = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(review.approved_amount)
        .bind(review.status)
        .bind(review.decision_log)
        .bind(review.rejection_reason)
        .bind(review.payroll_specialist_id)
        .bind(review.payroll_manager_id)
        .bind(review.finance_staff_id)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", &claim.claim_number));
        }
        Ok(())
    }

    /// Newest first; `None` filters match everything
    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
        employee_id: Option<EmployeeId>,
    ) -> Result<Vec<ClaimRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM claims \
             WHERE ($1::text IS NULL OR status = $1) AND ($2::uuid IS NULL OR employee_id = $2) \
             ORDER BY created_at DESC",
            CLAIM_COLUMNS
        );
        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(employee_id.map(Uuid::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// Repository for the `disputes` table
#[derive(Debug, Clone)]
pub struct DisputeRepository {
    pool: PgPool,
}

impl DisputeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_number(&self, dispute_number: &str) -> Result<Option<DisputeRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM disputes WHERE dispute_number = $1", DISPUTE_COLUMNS);
        let row = sqlx::query_as::<_, DisputeRow>(&sql)
            .bind(dispute_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn number_exists(&self, dispute_number: &str) -> Result<bool, DatabaseError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM disputes WHERE dispute_number = $1)")
                .bind(dispute_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM disputes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn insert(&self, dispute: &Dispute) -> Result<(), DatabaseError> {
        let review = ReviewBinds::from(&dispute.review);
        sqlx::query(
            r#"
            INSERT INTO disputes (
                id, dispute_number, payslip_reference, description, employee_id,
                approved_amount, status, decision_log, rejection_reason,
                payroll_specialist_id, payroll_manager_id, finance_staff_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*dispute.id.as_uuid())
        .bind(&dispute.dispute_number)
        .bind(&dispute.payslip_reference)
        .bind(&dispute.description)
        .bind(*dispute.employee_id.as_uuid())
        .bind(review.approved_amount)
        .bind(review.status)
        .bind(review.decision_log)
        .bind(review.rejection_reason)
        .bind(review.payroll_specialist_id)
        .bind(review.payroll_manager_id)
        .bind(review.finance_staff_id)
        .bind(dispute.created_at)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::DuplicateEntry(_) => {
                DatabaseError::duplicate("Dispute", "dispute_number", &dispute.dispute_number)
            }
            other => other,
        })?;
        Ok(())
    }

    pub async fn update_review(&self, dispute: &Dispute) -> Result<(), DatabaseError> {
        let review = ReviewBinds::from(&dispute.review);
        let result = sqlx::query(
            r#"
            UPDATE disputes SET
                approved_amount = $2, status = $3, decision_log = $4, rejection_reason = $5,
                payroll_specialist_id = $6, payroll_manager_id = $7, finance_staff_id = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(*dispute.id.as_uuid())
        .bind(review.approved_amount)
        .bind(review.status)
        .bind(review.decision_log)
        .bind(review.rejection_reason)
        .bind(review.payroll_specialist_id)
        .bind(review.payroll_manager_id)
        .bind(review.finance_staff_id)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Dispute", &dispute.dispute_number));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        status: Option<ReviewStatus>,
        employee_id: Option<EmployeeId>,
    ) -> Result<Vec<DisputeRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM disputes \
             WHERE ($1::text IS NULL OR status = $1) AND ($2::uuid IS NULL OR employee_id = $2) \
             ORDER BY created_at DESC",
            DISPUTE_COLUMNS
        );
        let rows = sqlx::query_as::<_, DisputeRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(employee_id.map(Uuid::from))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
