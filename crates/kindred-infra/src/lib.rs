//! Infrastructure implementations for Kindred.
//!
//! SQLite repositories (sqlx), the OpenAI-compatible text-generation
//! client, the SD-WebUI image backend, and data-directory resolution.

pub mod image;
pub mod llm;
pub mod paths;
pub mod sqlite;
