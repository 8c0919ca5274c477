//! HTTP API Layer
//!
//! This crate provides the REST API for payroll tracking using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims, disputes, refunds, notifications, chatbot
//! - **Middleware**: JWT authentication, audit logging, tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **State**: Services wired over `Arc<dyn Port>` adapters
//! - **Error Handling**: `{error, message}` bodies with consistent status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Ports};
//!
//! let state = AppState::new(config, Ports::postgres(pool), llm);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{chatbot, claims, disputes, health, notifications, refunds};
use crate::middleware::{audit_middleware, auth_middleware};

pub use crate::state::{AppState, Ports};

/// Creates the main API router
///
/// Health endpoints are public; everything under `/api/v1` needs a bearer token.
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::create_claim))
        .route("/mine", get(claims::my_claims))
        .route("/under-review", get(claims::under_review))
        .route("/pending-manager-approval", get(claims::pending_manager_approval))
        .route("/approved", get(claims::approved))
        .route("/:number", get(claims::get_claim))
        .route("/:number/review", post(claims::review_claim))
        .route("/:number/confirm", post(claims::confirm_claim))
        .route("/:number/refund", post(claims::generate_refund));

    let disputes_routes = Router::new()
        .route("/", post(disputes::create_dispute))
        .route("/mine", get(disputes::my_disputes))
        .route("/under-review", get(disputes::under_review))
        .route("/pending-manager-approval", get(disputes::pending_manager_approval))
        .route("/approved", get(disputes::approved))
        .route("/:number", get(disputes::get_dispute))
        .route("/:number/review", post(disputes::review_dispute))
        .route("/:number/confirm", post(disputes::confirm_dispute))
        .route("/:number/refund", post(disputes::generate_refund));

    let refunds_routes = Router::new()
        .route("/pending", get(refunds::pending_refunds))
        .route("/:id/paid", post(refunds::mark_paid));

    let notifications_routes = Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/read-all", post(notifications::mark_all_read))
        .route("/:id/read", post(notifications::mark_read));

    let chatbot_routes = Router::new()
        .route("/message", post(chatbot::send_message))
        .route("/new", post(chatbot::new_conversation));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/disputes", disputes_routes)
        .nest("/refunds", refunds_routes)
        .nest("/notifications", notifications_routes)
        .nest("/chatbot", chatbot_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
