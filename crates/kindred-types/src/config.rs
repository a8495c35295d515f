//! Global configuration types for Kindred.
//!
//! `KindredConfig` represents the top-level `config.toml` that selects the
//! text-generation backend, the image backend, and output locations.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Kindred backend.
///
/// Loaded from `~/.kindred/config.toml`. All fields have sensible defaults
/// targeting a local llama.cpp server and a local SD-WebUI instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KindredConfig {
    #[serde(default)]
    pub chat: ChatModelConfig,

    #[serde(default)]
    pub image: ImageBackendConfig,
}

/// Text-generation backend settings (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModelConfig {
    /// Base URL of the chat completions API.
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// Model identifier passed through to the backend.
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key, if the backend requires one. Local servers usually don't.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request generation timeout in seconds. 0 disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on generated tokens per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_chat_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_chat_model() -> String {
    "mistral-7b-instruct".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for ChatModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            model: default_chat_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Image backend settings (SD-WebUI compatible txt2img API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageBackendConfig {
    /// Base URL of the SD-WebUI API.
    #[serde(default = "default_image_base_url")]
    pub base_url: String,

    /// Directory generated PNGs are written to, relative to the data dir
    /// unless absolute.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_image_base_url() -> String {
    "http://127.0.0.1:7860".to_string()
}

fn default_output_dir() -> String {
    "generated_images".to_string()
}

impl Default for ImageBackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_base_url(),
            output_dir: default_output_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = KindredConfig::default();
        assert_eq!(config.chat.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.chat.model, "mistral-7b-instruct");
        assert_eq!(config.chat.timeout_secs, 120);
        assert!(config.chat.api_key.is_none());
        assert_eq!(config.image.output_dir, "generated_images");
    }

    #[test]
    fn test_config_deserialize_empty() {
        let config: KindredConfig = toml::from_str("").unwrap();
        assert_eq!(config.chat.max_tokens, 1024);
        assert_eq!(config.image.base_url, "http://127.0.0.1:7860");
    }

    #[test]
    fn test_config_deserialize_with_values() {
        let toml_str = r#"
[chat]
base_url = "http://127.0.0.1:11434/v1"
model = "llama3.1:8b"
timeout_secs = 60

[image]
output_dir = "/tmp/renders"
"#;
        let config: KindredConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.base_url, "http://127.0.0.1:11434/v1");
        assert_eq!(config.chat.model, "llama3.1:8b");
        assert_eq!(config.chat.timeout_secs, 60);
        // Unset fields still default
        assert_eq!(config.chat.max_tokens, 1024);
        assert_eq!(config.image.output_dir, "/tmp/renders");
        assert_eq!(config.image.base_url, "http://127.0.0.1:7860");
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = KindredConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: KindredConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.chat.model, config.chat.model);
    }
}
