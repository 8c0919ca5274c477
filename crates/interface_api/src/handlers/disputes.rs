//! Disputes handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, SystemRole};

use crate::auth::require_role;
use crate::dto::disputes::*;
use crate::dto::review::{GenerateRefundRequest, RefundResponse, ReviewRequest};
use crate::{error::ApiError, AppState};

fn respond(disputes: Vec<domain_claims::Dispute>) -> Json<Vec<DisputeResponse>> {
    Json(disputes.into_iter().map(DisputeResponse::from).collect())
}

/// Opens a payslip dispute for the caller
pub async fn create_dispute(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateDisputeRequest>,
) -> Result<(StatusCode, Json<DisputeResponse>), ApiError> {
    request.validate()?;
    let dispute = state.disputes.create_dispute(actor.employee_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(dispute.into())))
}

pub async fn my_disputes(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<DisputeResponse>>, ApiError> {
    Ok(respond(state.disputes.employee_disputes(actor.employee_id).await?))
}

/// Specialist work queue
pub async fn under_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<DisputeResponse>>, ApiError> {
    require_role(&actor, SystemRole::PayrollSpecialist)?;
    Ok(respond(state.disputes.disputes_under_review().await?))
}

/// Manager work queue
pub async fn pending_manager_approval(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<DisputeResponse>>, ApiError> {
    require_role(&actor, SystemRole::PayrollManager)?;
    Ok(respond(state.disputes.disputes_pending_manager_approval().await?))
}

/// Finance work queue: approved disputes without a refund
pub async fn approved(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<DisputeResponse>>, ApiError> {
    require_role(&actor, SystemRole::FinanceStaff)?;
    Ok(respond(state.disputes.approved_disputes_awaiting_refund().await?))
}

pub async fn get_dispute(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
) -> Result<Json<DisputeResponse>, ApiError> {
    let dispute = state.disputes.get_dispute(&number, &actor).await?;
    Ok(Json(dispute.into()))
}

pub async fn review_dispute(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<DisputeResponse>, ApiError> {
    require_role(&actor, SystemRole::PayrollSpecialist)?;
    request.validate()?;
    let dispute = state
        .disputes
        .approve_or_reject_dispute(&number, actor.employee_id, request.into_decision()?)
        .await?;
    Ok(Json(dispute.into()))
}

pub async fn confirm_dispute(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<DisputeResponse>, ApiError> {
    require_role(&actor, SystemRole::PayrollManager)?;
    request.validate()?;
    let dispute = state
        .disputes
        .confirm_dispute_approval(&number, actor.employee_id, request.into_decision()?)
        .await?;
    Ok(Json(dispute.into()))
}

/// An empty body resolves the amount from the decision log
pub async fn generate_refund(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<RefundResponse>), ApiError> {
    require_role(&actor, SystemRole::FinanceStaff)?;
    let request = GenerateRefundRequest::from_body(&body)?;
    let refund = state
        .disputes
        .generate_refund_for_dispute(&number, actor.employee_id, request.description, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(refund.into())))
}
