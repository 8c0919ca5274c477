//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::PortError;
use domain_assistant::AssistantError;
use domain_claims::{ClaimError, ErrorKind};
use domain_notifications::NotificationError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Amount constraint: {0}")]
    AmountConstraint(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::AmountConstraint(msg) => (StatusCode::BAD_REQUEST, "amount_constraint", msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Conflict and validation messages from adapters are already user-facing
fn port_message(err: &PortError) -> String {
    match err {
        PortError::Conflict { message } | PortError::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        let message = match &err {
            ClaimError::Port(inner) => port_message(inner),
            other => other.to_string(),
        };
        match err.kind() {
            ErrorKind::Validation => ApiError::Validation(message),
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::StateConflict => ApiError::Conflict(message),
            ErrorKind::AmountConstraint => ApiError::AmountConstraint(message),
            ErrorKind::Infrastructure => ApiError::Internal(message),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound(_) => ApiError::NotFound(err.to_string()),
            NotificationError::NoRecipients => ApiError::Validation(err.to_string()),
            NotificationError::Port(inner) if inner.is_not_found() => ApiError::NotFound(inner.to_string()),
            NotificationError::Port(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::NotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            AssistantError::Validation(msg) => ApiError::Validation(msg),
            AssistantError::Llm(_) => ApiError::ServiceUnavailable(err.to_string()),
            AssistantError::Port(inner) => ApiError::Internal(inner.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingRole(_) => ApiError::Forbidden(err.to_string()),
            _ => ApiError::Unauthorized,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::SystemRole;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_claim_error_status_mapping() {
        assert_eq!(status_of(ClaimError::validation("Amount is required")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ClaimError::not_found("Claim", "CLAIM-1")), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ClaimError::invalid_state("already approved")), StatusCode::CONFLICT);
        assert_eq!(status_of(ClaimError::amount("too much")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(ClaimError::from(PortError::connection("down"))), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_port_conflict_keeps_adapter_message() {
        let err = ApiError::from(ClaimError::from(PortError::conflict(
            "A pending refund already exists for this claim",
        )));
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "A pending refund already exists for this claim"));
    }

    #[test]
    fn test_assistant_error_mapping() {
        assert_eq!(status_of(AssistantError::NotConfigured), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_of(AssistantError::Validation("empty".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AssistantError::Llm(PortError::unavailable("groq"))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(status_of(AuthError::TokenExpired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::MissingRole(SystemRole::FinanceStaff)), StatusCode::FORBIDDEN);
    }
}
