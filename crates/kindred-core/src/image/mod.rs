//! Image generation service and backend trait.

pub mod service;

pub use service::{ImageBackend, ImageService};
