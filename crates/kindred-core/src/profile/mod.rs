//! Profile and session lifecycle management.

pub mod service;
