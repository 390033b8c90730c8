//! Remote text-to-image background generation with procedural fallback
//!
//! Wraps the procedural generator as the failure handler for the remote
//! call: any transport error, non-2xx status, or undecodable payload
//! degrades to the deterministic gradient for the same label and size.

use super::{BackgroundSource, ProceduralGenerator};
use crate::error::{Result, SceneMergeError};
use crate::types::{BackgroundOrigin, CharacterLabel, SynthesizedBackground};
use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Diffusion sampling steps for the generation request
const NUM_INFERENCE_STEPS: u32 = 20;

/// Classifier-free guidance scale for the generation request
const GUIDANCE_SCALE: f32 = 7.5;

/// Prompt used for labels without a dedicated scene description
const DEFAULT_PROMPT: &str = "Fantasy landscape with magical atmosphere, high quality, detailed";

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    width: u32,
    height: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
}

/// Background source backed by a text-to-image inference endpoint
pub struct RemoteGenerator {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl RemoteGenerator {
    /// Create a remote generator with a bounded request timeout
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Network` if the HTTP client cannot be built.
    pub fn new(endpoint: &str, api_token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SceneMergeError::network("create HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_token: api_token.to_string(),
        })
    }

    /// Scene prompt for a character label
    fn build_prompt(label: &CharacterLabel) -> &'static str {
        match label.as_str() {
            "pikachu" => {
                "A magical Pokemon forest with electric sparks, cherry blossoms, \
                 mystical atmosphere, anime style, high quality, detailed"
            },
            "naruto" => {
                "Hidden Leaf Village with traditional Japanese architecture, \
                 cherry blossoms, ninja scrolls, anime style, detailed"
            },
            "spiderman" => {
                "New York City skyline at sunset, skyscrapers, web-swinging \
                 perspective, comic book style, dynamic"
            },
            "batman" => {
                "Gothic Gotham City at night, dark alleys, bat signal in sky, \
                 noir atmosphere, cinematic"
            },
            _ => DEFAULT_PROMPT,
        }
    }

    async fn request_background(
        &self,
        label: &CharacterLabel,
        width: u32,
        height: u32,
    ) -> Result<RgbImage> {
        let payload = GenerationRequest {
            inputs: Self::build_prompt(label),
            parameters: GenerationParameters {
                width,
                height,
                num_inference_steps: NUM_INFERENCE_STEPS,
                guidance_scale: GUIDANCE_SCALE,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SceneMergeError::network("background generation request", e))?;

        if !response.status().is_success() {
            return Err(SceneMergeError::synthesis(format!(
                "generation endpoint returned status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SceneMergeError::network("read generation response", e))?;

        let image = image::load_from_memory(&bytes)
            .map_err(|e| SceneMergeError::synthesis(format!("undecodable payload: {e}")))?;

        Ok(image.to_rgb8())
    }
}

#[async_trait]
impl BackgroundSource for RemoteGenerator {
    async fn synthesize(
        &self,
        label: &CharacterLabel,
        width: u32,
        height: u32,
    ) -> SynthesizedBackground {
        match self.request_background(label, width, height).await {
            Ok(image) => {
                tracing::debug!(%label, width, height, "Remote background generated");
                SynthesizedBackground {
                    image,
                    origin: BackgroundOrigin::Remote,
                }
            },
            Err(e) => {
                // Degraded, not failed: the procedural gradient stands in.
                tracing::warn!(%label, error = %e, "Background synthesis degraded to procedural fallback");
                SynthesizedBackground {
                    image: ProceduralGenerator::generate(label, width, height),
                    origin: BackgroundOrigin::Procedural,
                }
            },
        }
    }
}
