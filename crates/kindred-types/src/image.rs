//! Image generation request/record types.
//!
//! The actual diffusion run is delegated to an external backend; these
//! types only carry the parameters, validate their ranges, and describe
//! the persisted generation metadata.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ImageError;

/// Known diffusion model identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageModel {
    StableDiffusion,
    WaifuDiffusion,
}

impl ImageModel {
    pub const ALL: [ImageModel; 2] = [ImageModel::StableDiffusion, ImageModel::WaifuDiffusion];

    /// Checkpoint name the backend selects when this model is requested.
    pub fn checkpoint(&self) -> &'static str {
        match self {
            ImageModel::StableDiffusion => "sd-v1-4",
            ImageModel::WaifuDiffusion => "waifu-diffusion-v1-4",
        }
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageModel::StableDiffusion => write!(f, "stable_diffusion"),
            ImageModel::WaifuDiffusion => write!(f, "waifu_diffusion"),
        }
    }
}

impl FromStr for ImageModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable_diffusion" => Ok(ImageModel::StableDiffusion),
            "waifu_diffusion" => Ok(ImageModel::WaifuDiffusion),
            other => Err(format!("invalid model name: '{other}'")),
        }
    }
}

/// Parameters for one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    #[serde(default = "default_model")]
    pub model: ImageModel,
    #[serde(default = "default_steps")]
    pub steps: u16,
    #[serde(default = "default_cfg_scale")]
    pub cfg_scale: f32,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    /// Fixed seed for reproducibility; the backend picks one when absent.
    #[serde(default)]
    pub seed: Option<i64>,
}

fn default_model() -> ImageModel {
    ImageModel::StableDiffusion
}

fn default_steps() -> u16 {
    30
}

fn default_cfg_scale() -> f32 {
    7.5
}

fn default_dimension() -> u32 {
    512
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            negative_prompt: String::new(),
            model: default_model(),
            steps: default_steps(),
            cfg_scale: default_cfg_scale(),
            width: default_dimension(),
            height: default_dimension(),
            seed: None,
        }
    }

    /// Range-check the request. Raised synchronously to the caller; never
    /// retried.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.steps < 1 || self.steps > 100 {
            return Err(ImageError::StepsOutOfRange(self.steps));
        }
        Ok(())
    }
}

/// Numeric parameters persisted alongside a generated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageParams {
    pub steps: u16,
    pub cfg_scale: f32,
    pub width: u32,
    pub height: u32,
    pub seed: Option<i64>,
}

impl From<&ImageRequest> for ImageParams {
    fn from(req: &ImageRequest) -> Self {
        Self {
            steps: req.steps,
            cfg_scale: req.cfg_scale,
            width: req.width,
            height: req.height,
            seed: req.seed,
        }
    }
}

/// Metadata row for one generated image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: Uuid,
    pub prompt: String,
    pub negative_prompt: String,
    pub model: ImageModel,
    pub params: ImageParams,
    /// Filesystem path the PNG was written to.
    pub path: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in ImageModel::ALL {
            let s = model.to_string();
            let parsed: ImageModel = s.parse().unwrap();
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_model_rejects_unknown() {
        let err = "midjourney".parse::<ImageModel>().unwrap_err();
        assert_eq!(err, "invalid model name: 'midjourney'");
    }

    #[test]
    fn test_request_defaults() {
        let req = ImageRequest::new("a lighthouse at dusk");
        assert_eq!(req.steps, 30);
        assert!((req.cfg_scale - 7.5).abs() < f32::EPSILON);
        assert_eq!(req.width, 512);
        assert_eq!(req.height, 512);
        assert_eq!(req.model, ImageModel::StableDiffusion);
        assert!(req.seed.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_steps_range() {
        let mut req = ImageRequest::new("x");
        req.steps = 0;
        assert!(matches!(
            req.validate(),
            Err(ImageError::StepsOutOfRange(0))
        ));
        req.steps = 101;
        assert!(matches!(
            req.validate(),
            Err(ImageError::StepsOutOfRange(101))
        ));
        req.steps = 100;
        assert!(req.validate().is_ok());
        req.steps = 1;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_request_deserialize_with_defaults() {
        let json = r#"{"prompt":"a fox"}"#;
        let req: ImageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.prompt, "a fox");
        assert_eq!(req.steps, 30);
        assert_eq!(req.negative_prompt, "");
    }
}
