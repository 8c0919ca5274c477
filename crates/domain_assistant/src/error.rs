//! Assistant errors

use core_kernel::PortError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    /// No LLM client was configured at startup
    #[error("The assistant is not configured. Set API_GROQ_API_KEY to enable it.")]
    NotConfigured,

    #[error("{0}")]
    Validation(String),

    /// The LLM provider failed or could not be reached
    #[error("LLM request failed: {0}")]
    Llm(#[source] PortError),

    #[error(transparent)]
    Port(#[from] PortError),
}
