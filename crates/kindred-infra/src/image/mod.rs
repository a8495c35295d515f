//! Image-generation backends.

pub mod sd_webui;

pub use sd_webui::SdWebuiBackend;
