//! OpenAI-compatible text-generation backend.
//!
//! One implementation covers every server speaking the chat completions
//! dialect: llama.cpp's server, Ollama, vLLM, LM Studio, or the hosted
//! APIs. The endpoint is selected purely by base URL.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};

use kindred_core::llm::TextGenerator;
use kindred_types::config::ChatModelConfig;
use kindred_types::error::GenerateError;

/// Generator for any OpenAI-compatible chat completions API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
pub struct OpenAiCompatGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
}

impl OpenAiCompatGenerator {
    /// Create a generator from the chat backend configuration.
    pub fn new(config: &ChatModelConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_base(&config.base_url);
        if let Some(ref key) = config.api_key {
            openai_config = openai_config.with_api_key(key);
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    /// Build a chat completion request carrying the assembled prompt as a
    /// single user message. The prompt already contains the persona
    /// context and transcript, so no system message is added.
    fn build_request(&self, prompt: &str) -> CreateChatCompletionRequest {
        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                name: None,
            },
        )];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl TextGenerator for OpenAiCompatGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}

/// Map an `async_openai::error::OpenAIError` to a [`GenerateError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> GenerateError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            // A model-not-found error from a local server usually means the
            // checkpoint was never loaded; surface that distinctly.
            let code = api_err.code.as_deref().unwrap_or("");
            if code == "model_not_found" || api_err.message.contains("model") {
                GenerateError::ModelLoad(api_err.message.clone())
            } else {
                GenerateError::Backend(err.to_string())
            }
        }
        _ => GenerateError::Backend(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ChatModelConfig {
        ChatModelConfig {
            base_url: "http://127.0.0.1:11434/v1".to_string(),
            model: "llama3.1:8b".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 256,
        }
    }

    #[test]
    fn test_model_name_from_config() {
        let generator = OpenAiCompatGenerator::new(&local_config());
        assert_eq!(generator.model_name(), "llama3.1:8b");
    }

    #[test]
    fn test_build_request_single_user_message() {
        let generator = OpenAiCompatGenerator::new(&local_config());
        let request = generator.build_request("[System Context]\n{}\n");

        assert_eq!(request.model, "llama3.1:8b");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_completion_tokens, Some(256));
        assert!(request.stream.is_none());
    }

    #[test]
    fn test_map_openai_error_model_load() {
        use async_openai::error::{ApiError, OpenAIError};
        let api_err = ApiError {
            message: "model 'llama3.1:8b' not found".to_string(),
            r#type: None,
            param: None,
            code: Some("model_not_found".to_string()),
        };
        let err = map_openai_error(OpenAIError::ApiError(api_err));
        assert!(matches!(err, GenerateError::ModelLoad(_)));
    }

    #[test]
    fn test_map_openai_error_backend() {
        use async_openai::error::OpenAIError;
        let err = map_openai_error(OpenAIError::InvalidArgument("bad".to_string()));
        assert!(matches!(err, GenerateError::Backend(_)));
    }
}
