//! Subject extraction (matting) provider abstraction
//!
//! Matting is an external capability: raw image bytes go in, a same-sized
//! RGBA image with per-pixel subject opacity comes out. The pipeline only
//! consumes the contract; the HTTP client here talks to a rembg-style
//! service, and `MockMattingProvider` stands in for tests.

use crate::error::{Result, SceneMergeError};
use async_trait::async_trait;
use image::RgbaImage;
use reqwest::Client;
use std::time::Duration;

/// Provider of per-pixel subject opacity for an encoded image
#[async_trait]
pub trait MattingProvider: Send + Sync {
    /// Extract the subject from encoded image bytes
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Matting` when the bytes are not a decodable
    /// image or the provider is unreachable.
    async fn extract_subject(&self, image_bytes: &[u8]) -> Result<RgbaImage>;
}

/// Matting provider backed by an HTTP service
///
/// Posts the raw image bytes and expects an encoded RGBA image (typically
/// PNG) in the response body. The client is stateless and safe to share
/// across concurrent requests.
pub struct HttpMattingClient {
    client: Client,
    endpoint: String,
}

impl HttpMattingClient {
    /// Create a matting client with a bounded request timeout
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Network` if the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SceneMergeError::network("create HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl MattingProvider for HttpMattingClient {
    async fn extract_subject(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
        // Reject undecodable input before the round trip; a decode failure
        // is the caller's error, not a provider outage.
        image::load_from_memory(image_bytes)
            .map_err(|e| SceneMergeError::decode(format!("input image: {e}")))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image_bytes.to_vec())
            .send()
            .await
            .map_err(|e| SceneMergeError::matting(format!("matting request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SceneMergeError::matting(format!(
                "matting service returned status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SceneMergeError::matting(format!("reading matting response: {e}")))?;

        let image = image::load_from_memory(&bytes)
            .map_err(|e| SceneMergeError::matting(format!("matting payload not an image: {e}")))?;

        // The subject contract is always 4-channel.
        Ok(image.to_rgba8())
    }
}

/// Placeholder for pipelines that start from a pre-matted subject
///
/// Any attempt to extract a subject is a configuration error.
pub(crate) struct NoMattingProvider;

#[async_trait]
impl MattingProvider for NoMattingProvider {
    async fn extract_subject(&self, _image_bytes: &[u8]) -> Result<RgbaImage> {
        Err(SceneMergeError::matting("no matting provider configured"))
    }
}

/// In-memory matting provider for tests and examples
///
/// Returns a pre-built subject regardless of input, or fails on demand to
/// exercise error propagation.
pub struct MockMattingProvider {
    subject: Option<RgbaImage>,
}

impl MockMattingProvider {
    /// Provider that always returns the given subject
    #[must_use]
    pub fn with_subject(subject: RgbaImage) -> Self {
        Self {
            subject: Some(subject),
        }
    }

    /// Provider that always fails with a matting error
    #[must_use]
    pub fn failing() -> Self {
        Self { subject: None }
    }
}

#[async_trait]
impl MattingProvider for MockMattingProvider {
    async fn extract_subject(&self, _image_bytes: &[u8]) -> Result<RgbaImage> {
        self.subject
            .clone()
            .ok_or_else(|| SceneMergeError::matting("mock provider configured to fail"))
    }
}
