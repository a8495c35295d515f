//! Conversation engine: prompt assembly and transcript management.

pub mod engine;
pub mod prompt;
