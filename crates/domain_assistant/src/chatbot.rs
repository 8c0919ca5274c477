//! Chatbot orchestration
//!
//! One call to [`ChatbotService::process_message`] runs a bounded
//! conversation with the model:
//!
//! 1. system prompt, recent history, and the new user message go out with
//!    the tool catalog
//! 2. while the model asks for tools and fewer than `max_tool_iterations`
//!    rounds ran, the tools execute and their results go back
//! 3. the final text (or a fallback) is stored with the user message and the
//!    history is trimmed

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use core_kernel::{Actor, EmployeeId};

use crate::conversation::{Conversation, ConversationPort, StoredMessage, CONTEXT_MESSAGES, HISTORY_LIMIT};
use crate::error::AssistantError;
use crate::llm::{ChatMessage, ChatRole, LlmClient, ToolDefinition};
use crate::tools::{tool_catalog, ToolExecutor};

pub const MAX_TOOL_ITERATIONS: usize = 5;

pub const FALLBACK_RESPONSE: &str = "I apologize, but I could not generate a response.";

#[derive(Debug, Clone)]
pub struct ChatbotSettings {
    pub max_tool_iterations: usize,
    pub context_messages: usize,
    pub history_limit: usize,
}

impl Default for ChatbotSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: MAX_TOOL_ITERATIONS,
            context_messages: CONTEXT_MESSAGES,
            history_limit: HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ChatbotService {
    llm: Option<Arc<dyn LlmClient>>,
    conversations: Arc<dyn ConversationPort>,
    tools: ToolExecutor,
    catalog: Arc<Vec<ToolDefinition>>,
    settings: ChatbotSettings,
}

impl ChatbotService {
    /// `llm` is `None` when no provider is configured; the service then
    /// refuses every message
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        conversations: Arc<dyn ConversationPort>,
        tools: ToolExecutor,
    ) -> Self {
        Self {
            llm,
            conversations,
            tools,
            catalog: Arc::new(tool_catalog()),
            settings: ChatbotSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: ChatbotSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    #[instrument(skip(self, message, user), fields(employee_id = %user.employee_id))]
    pub async fn process_message(&self, message: &str, user: &Actor) -> Result<ChatReply, AssistantError> {
        let llm = self.llm.as_ref().ok_or(AssistantError::NotConfigured)?;
        let message = message.trim();
        if message.is_empty() {
            return Err(AssistantError::Validation("Message must not be empty".to_string()));
        }

        let mut conversation = self.active_conversation(user.employee_id).await?;

        let mut messages = Vec::with_capacity(self.settings.context_messages + 2);
        messages.push(ChatMessage::system(system_prompt(user)));
        messages.extend(conversation.recent_context(self.settings.context_messages));
        messages.push(ChatMessage::user(message));

        let mut reply = llm.chat(&messages, &self.catalog).await.map_err(AssistantError::Llm)?;
        let mut iterations = 0;
        while reply.wants_tools() && iterations < self.settings.max_tool_iterations {
            iterations += 1;
            debug!(iteration = iterations, calls = reply.tool_calls.len(), "Model requested tools");

            let calls = std::mem::take(&mut reply.tool_calls);
            messages.push(ChatMessage::assistant_tool_calls(reply.content.take(), calls.clone()));
            for call in &calls {
                let result = self.tools.execute(&call.name, &call.arguments, user).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), result.to_message_content()));
            }

            reply = llm.chat(&messages, &self.catalog).await.map_err(AssistantError::Llm)?;
        }
        if reply.wants_tools() {
            warn!(iterations, "Tool iteration limit reached; answering with what the model returned");
        }

        let response = reply
            .content
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_RESPONSE.to_string());

        let now = Utc::now();
        conversation.push(StoredMessage::new(ChatRole::User, message, now));
        conversation.push(StoredMessage::new(ChatRole::Assistant, response.clone(), now));
        conversation.trim_to(self.settings.history_limit);
        self.conversations.save(&conversation).await?;

        info!(iterations, "Assistant replied");
        Ok(ChatReply {
            response,
            timestamp: now,
        })
    }

    /// Ends the active conversation so the next message starts fresh
    #[instrument(skip(self))]
    pub async fn start_new_conversation(&self, employee_id: EmployeeId) -> Result<(), AssistantError> {
        let ended = self.conversations.end_active(employee_id).await?;
        debug!(ended, "Active conversation ended");
        Ok(())
    }

    async fn active_conversation(&self, employee_id: EmployeeId) -> Result<Conversation, AssistantError> {
        if let Some(conversation) = self.conversations.find_active(employee_id).await? {
            return Ok(conversation);
        }
        let conversation = Conversation::start(employee_id, Utc::now());
        self.conversations.insert(&conversation).await?;
        Ok(conversation)
    }
}

/// Instructions and user context sent as the first message
pub fn system_prompt(user: &Actor) -> String {
    let roles = if user.roles.is_empty() {
        "Standard User".to_string()
    } else {
        user.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
    };
    format!(
        "You are Arcana, an intelligent HR assistant for an organization.

## Available Tools

Use the tool that matches the user's question:
- **getProfile** - The user's employee id, name and roles
- **getMyClaims** - The user's expense claims (optional status filter)
- **countClaimsByStatus** - How many of the user's claims are in each status
- **getPendingApprovals** - Claims and disputes waiting on the user's payroll role
- **getMyNotifications** - The user's notifications

## Guidelines

1. Always call a tool when the user asks for data. Never guess or make up information.
2. Summarize results in a friendly, conversational way.
3. Keep responses under 150 words unless more detail is needed.
4. If a tool fails, explain the issue politely and suggest alternatives.
5. Remember context from the conversation.

## Current User

- **Employee ID**: {}
- **Name**: {}
- **Roles**: {}",
        user.employee_id,
        user.name.as_deref().unwrap_or("Employee"),
        roles,
    )
}
