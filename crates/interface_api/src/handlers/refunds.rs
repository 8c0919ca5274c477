//! Refund handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{Actor, RefundId, SystemRole};

use crate::auth::require_role;
use crate::dto::review::RefundResponse;
use crate::{error::ApiError, AppState};

/// Pending refunds awaiting payout
pub async fn pending_refunds(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<RefundResponse>>, ApiError> {
    require_role(&actor, SystemRole::FinanceStaff)?;
    let refunds = state.refunds.pending_refunds().await?;
    Ok(Json(refunds.into_iter().map(RefundResponse::from).collect()))
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<RefundResponse>, ApiError> {
    require_role(&actor, SystemRole::FinanceStaff)?;
    let refund = state
        .refunds
        .mark_refund_paid(RefundId::from_uuid(id), actor.employee_id)
        .await?;
    Ok(Json(refund.into()))
}
