//! Claims handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{Actor, SystemRole};

use crate::auth::require_role;
use crate::dto::claims::*;
use crate::dto::review::{GenerateRefundRequest, RefundResponse, ReviewRequest};
use crate::{error::ApiError, AppState};

fn respond(claims: Vec<domain_claims::Claim>) -> Json<Vec<ClaimResponse>> {
    Json(claims.into_iter().map(ClaimResponse::from).collect())
}

/// Submits a claim for the caller
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let claim = state.claims.create_claim(actor.employee_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

pub async fn my_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    Ok(respond(state.claims.employee_claims(actor.employee_id).await?))
}

/// Specialist work queue
pub async fn under_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    require_role(&actor, SystemRole::PayrollSpecialist)?;
    Ok(respond(state.claims.claims_under_review().await?))
}

/// Manager work queue
pub async fn pending_manager_approval(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    require_role(&actor, SystemRole::PayrollManager)?;
    Ok(respond(state.claims.claims_pending_manager_approval().await?))
}

/// Finance work queue: approved claims without a refund
pub async fn approved(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    require_role(&actor, SystemRole::FinanceStaff)?;
    Ok(respond(state.claims.approved_claims_awaiting_refund().await?))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.claims.get_claim(&number, &actor).await?;
    Ok(Json(claim.into()))
}

pub async fn review_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require_role(&actor, SystemRole::PayrollSpecialist)?;
    request.validate()?;
    let claim = state
        .claims
        .approve_or_reject_claim(&number, actor.employee_id, request.into_decision()?)
        .await?;
    Ok(Json(claim.into()))
}

pub async fn confirm_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(number): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    require_role(&actor, SystemRole::PayrollManager)?;
    request.validate()?;
    let claim = state
        .claims
        .confirm_claim_approval(&number, actor.employee_id, request.into_decision()?)
        .await?;
    Ok(Json(claim.into()))
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
        .claims
        .generate_refund_for_claim(&number, actor.employee_id, request.description, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(refund.into())))
}
