//! Rule-based assistant.
//!
//! This module builds the per-request chat context and answers messages
//! with keyword rules.

pub mod context;
pub mod responder;
pub mod rules;

pub use context::{build_chat_context, DEFAULT_CONTEXT_TODOS};
pub use responder::{classify, reply};
pub use rules::render_rules;
