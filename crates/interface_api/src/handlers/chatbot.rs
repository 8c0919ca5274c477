//! Chatbot handlers

use axum::{extract::State, Extension, Json};
use validator::Validate;

use core_kernel::Actor;
use domain_assistant::ChatReply;

use crate::dto::chatbot::{ChatMessageRequest, NewConversationResponse};
use crate::{error::ApiError, AppState};

pub async fn send_message(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    request.validate()?;
    let reply = state.chatbot.process_message(&request.message, &actor).await?;
    Ok(Json(reply))
}

/// Ends the caller's active conversation so the next message starts fresh
pub async fn new_conversation(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<NewConversationResponse>, ApiError> {
    state.chatbot.start_new_conversation(actor.employee_id).await?;
    Ok(Json(NewConversationResponse {
        message: "New conversation started".to_string(),
    }))
}
