//! Text-generation backends.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatGenerator;
