//! Configuration types for scene compositing operations

use crate::error::{Result, SceneMergeError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default text-to-image inference endpoint
pub const DEFAULT_GENERATION_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

/// Environment variable holding the text-to-image provider token
pub const API_TOKEN_ENV: &str = "HUGGINGFACE_API_TOKEN";

/// Environment variable holding the matting service endpoint
pub const MATTING_ENDPOINT_ENV: &str = "MATTING_ENDPOINT";

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG (lossless, the default service response format)
    Png,
    /// JPEG (lossy, quality-controlled)
    Jpeg,
    /// WebP (lossless encoding via the image crate)
    WebP,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

/// Configuration for a scene compositing processor
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Endpoint of the subject-extraction (matting) service
    pub matting_endpoint: Option<String>,
    /// Endpoint of the text-to-image background provider
    pub generation_endpoint: String,
    /// Bearer token for the background provider; procedural-only when absent
    pub api_token: Option<String>,
    /// Bound on every external provider call
    pub request_timeout: Duration,
    /// Output format for encoded results
    pub output_format: OutputFormat,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Enable debug mode
    pub debug: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            matting_endpoint: None,
            generation_endpoint: DEFAULT_GENERATION_ENDPOINT.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(60),
            output_format: OutputFormat::Png,
            jpeg_quality: 90,
            debug: false,
        }
    }
}

impl ComposeConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> ComposeConfigBuilder {
        ComposeConfigBuilder::new()
    }

    /// Build a configuration from the process environment
    ///
    /// Reads `HUGGINGFACE_API_TOKEN` for the background provider token and
    /// `MATTING_ENDPOINT` for the matting service. Missing variables leave
    /// the corresponding capability unconfigured rather than failing.
    #[must_use]
    pub fn from_env() -> Self {
        let api_token = std::env::var(API_TOKEN_ENV).ok().filter(|t| !t.is_empty());
        let matting_endpoint = std::env::var(MATTING_ENDPOINT_ENV)
            .ok()
            .filter(|e| !e.is_empty());

        if api_token.is_none() {
            log::info!("No background provider token configured; using procedural backgrounds");
        }

        Self {
            matting_endpoint,
            api_token,
            ..Self::default()
        }
    }
}

/// Builder for `ComposeConfig`
pub struct ComposeConfigBuilder {
    config: ComposeConfig,
}

impl ComposeConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ComposeConfig::default(),
        }
    }

    #[must_use]
    pub fn matting_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.matting_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn generation_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.generation_endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn api_token<S: Into<String>>(mut self, token: S) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality;
        self
    }

    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::InvalidConfig` for:
    /// - JPEG quality outside 1-100
    /// - A zero request timeout
    /// - An empty generation endpoint
    pub fn build(self) -> Result<ComposeConfig> {
        if self.config.jpeg_quality == 0 || self.config.jpeg_quality > 100 {
            return Err(SceneMergeError::invalid_config(
                "JPEG quality must be 1-100",
            ));
        }
        if self.config.request_timeout.is_zero() {
            return Err(SceneMergeError::invalid_config(
                "Request timeout must be non-zero",
            ));
        }
        if self.config.generation_endpoint.is_empty() {
            return Err(SceneMergeError::invalid_config(
                "Generation endpoint must not be empty",
            ));
        }
        Ok(self.config)
    }
}

impl Default for ComposeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ComposeConfig::default();
        assert!(config.api_token.is_none());
        assert!(config.matting_endpoint.is_none());
        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_chain() {
        let config = ComposeConfig::builder()
            .matting_endpoint("http://localhost:7000/matting")
            .api_token("hf_test")
            .jpeg_quality(85)
            .output_format(OutputFormat::Jpeg)
            .request_timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(
            config.matting_endpoint.as_deref(),
            Some("http://localhost:7000/matting")
        );
        assert_eq!(config.api_token.as_deref(), Some("hf_test"));
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
    }

    #[test]
    fn test_builder_rejects_invalid_quality() {
        let result = ComposeConfig::builder().jpeg_quality(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = ComposeConfig::builder()
            .request_timeout(Duration::ZERO)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_empty_endpoint() {
        let result = ComposeConfig::builder().generation_endpoint("").build();
        assert!(result.is_err());
    }
}
