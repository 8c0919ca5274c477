//! Payroll Tracking Assistant
//!
//! A chat assistant that answers questions about the caller's claims,
//! approval queues, and notifications. The model decides which read-only
//! tools to call; [`ChatbotService`] executes them and feeds the results
//! back, for at most [`MAX_TOOL_ITERATIONS`] rounds.
//!
//! The LLM is an optional capability: without a configured client every
//! request fails with [`AssistantError::NotConfigured`].

pub mod llm;
pub mod groq;
pub mod tools;
pub mod conversation;
pub mod chatbot;
pub mod error;

pub use llm::{ChatMessage, ChatRole, LlmClient, LlmReply, ToolCall, ToolDefinition};
pub use groq::{GroqClient, GroqConfig};
pub use tools::{tool_catalog, ToolExecutor, ToolResult, MAX_TOOL_RESULTS};
pub use conversation::{Conversation, ConversationPort, StoredMessage};
pub use chatbot::{ChatReply, ChatbotService, ChatbotSettings, MAX_TOOL_ITERATIONS, FALLBACK_RESPONSE};
pub use error::AssistantError;
