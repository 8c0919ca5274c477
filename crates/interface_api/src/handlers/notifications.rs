//! Notification handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::{Actor, NotificationId};

use crate::dto::notifications::{MarkAllReadResponse, NotificationResponse};
use crate::{error::ApiError, AppState};

/// The caller's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let views = state.notifications.notifications_for(actor.employee_id).await?;
    Ok(Json(views.into_iter().map(NotificationResponse::from).collect()))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let view = state
        .notifications
        .mark_as_read(NotificationId::from_uuid(id), actor.employee_id)
        .await?;
    Ok(Json(view.into()))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = state.notifications.mark_all_as_read(actor.employee_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
