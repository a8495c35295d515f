//! Business logic for Kindred.
//!
//! Services are generic over the repository traits in [`repository`];
//! concrete implementations live in kindred-infra.

pub mod chat;
pub mod image;
pub mod llm;
pub mod profile;
pub mod repository;
