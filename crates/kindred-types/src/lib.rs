//! Shared domain types for Kindred.
//!
//! This crate contains the core domain types used across the Kindred
//! companion backend: profiles, sessions, transcripts, image requests,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod image;
pub mod profile;
pub mod session;
