//! REST API handler modules.

pub mod chat;
pub mod image;
pub mod profile;
pub mod session;
