//! Request handlers, one module per resource

pub mod health;
pub mod claims;
pub mod disputes;
pub mod refunds;
pub mod notifications;
pub mod chatbot;
