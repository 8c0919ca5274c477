//! Request and response bodies

pub mod claims;
pub mod disputes;
pub mod review;
pub mod notifications;
pub mod chatbot;
