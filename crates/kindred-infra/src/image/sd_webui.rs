//! Stable Diffusion WebUI (AUTOMATIC1111) image backend.
//!
//! Talks to the `/sdapi/v1/txt2img` endpoint. The checkpoint is switched
//! per request via `override_settings`, so one WebUI instance serves all
//! known models.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use kindred_core::image::service::ImageBackend;
use kindred_types::config::ImageBackendConfig;
use kindred_types::error::ImageError;
use kindred_types::image::ImageRequest;

/// Backend delegating diffusion to a running SD-WebUI instance.
#[derive(Debug, Clone)]
pub struct SdWebuiBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    steps: u16,
    cfg_scale: f32,
    width: u32,
    height: u32,
    seed: i64,
    override_settings: OverrideSettings,
}

#[derive(Serialize)]
struct OverrideSettings {
    sd_model_checkpoint: &'static str,
}

#[derive(Deserialize)]
struct Txt2ImgResponse {
    images: Vec<String>,
}

impl SdWebuiBackend {
    /// Create a backend from the image backend configuration.
    pub fn new(config: &ImageBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn payload<'a>(request: &'a ImageRequest) -> Txt2ImgRequest<'a> {
        Txt2ImgRequest {
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
            steps: request.steps,
            cfg_scale: request.cfg_scale,
            width: request.width,
            height: request.height,
            // -1 asks WebUI to pick a random seed
            seed: request.seed.unwrap_or(-1),
            override_settings: OverrideSettings {
                sd_model_checkpoint: request.model.checkpoint(),
            },
        }
    }
}

impl ImageBackend for SdWebuiBackend {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, ImageError> {
        let url = format!("{}/sdapi/v1/txt2img", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&Self::payload(request))
            .send()
            .await
            .map_err(|e| ImageError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::Backend(format!(
                "txt2img returned HTTP {}",
                response.status()
            )));
        }

        let body: Txt2ImgResponse = response
            .json()
            .await
            .map_err(|e| ImageError::Backend(format!("invalid txt2img response: {e}")))?;

        let first = body
            .images
            .first()
            .ok_or_else(|| ImageError::Backend("txt2img returned no images".to_string()))?;

        BASE64
            .decode(first)
            .map_err(|e| ImageError::Backend(format!("invalid image encoding: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindred_types::image::ImageModel;

    #[test]
    fn test_payload_defaults() {
        let request = ImageRequest::new("a lighthouse at dusk");
        let payload = SdWebuiBackend::payload(&request);

        assert_eq!(payload.seed, -1);
        assert_eq!(payload.steps, 30);
        assert_eq!(payload.override_settings.sd_model_checkpoint, "sd-v1-4");
    }

    #[test]
    fn test_payload_model_checkpoint() {
        let mut request = ImageRequest::new("x");
        request.model = ImageModel::WaifuDiffusion;
        request.seed = Some(42);
        let payload = SdWebuiBackend::payload(&request);

        assert_eq!(payload.seed, 42);
        assert_eq!(
            payload.override_settings.sd_model_checkpoint,
            "waifu-diffusion-v1-4"
        );
    }

    #[test]
    fn test_payload_serializes_flat_json() {
        let request = ImageRequest::new("a fox");
        let json = serde_json::to_value(SdWebuiBackend::payload(&request)).unwrap();

        assert_eq!(json["prompt"], "a fox");
        assert_eq!(json["seed"], -1);
        assert_eq!(
            json["override_settings"]["sd_model_checkpoint"],
            "sd-v1-4"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = SdWebuiBackend::new(&ImageBackendConfig {
            base_url: "http://127.0.0.1:7860/".to_string(),
            output_dir: "out".to_string(),
        });
        assert_eq!(backend.base_url, "http://127.0.0.1:7860");
    }
}
