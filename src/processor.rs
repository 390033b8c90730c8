//! Scene compositing processor
//!
//! Orchestrates the straight-line pipeline: subject extraction, background
//! synthesis, geometry normalization, lighting analysis, alpha blending,
//! and the final post-processing pass. Each request is an independent
//! computation with no shared mutable state, so one processor instance can
//! serve concurrent requests as long as its providers are share-safe (the
//! bundled HTTP clients are).

use crate::{
    background::{self, BackgroundSource},
    compositor,
    config::ComposeConfig,
    error::{Result, SceneMergeError},
    geometry, lighting,
    matting::{HttpMattingClient, MattingProvider},
    postprocess,
    types::{
        BlendParameters, CharacterLabel, CompositeResult, ProcessingMetadata, ProcessingTimings,
    },
};
use image::RgbaImage;
use instant::Instant;
use tracing::{debug, info, instrument, span, Level};

/// Scene compositing processor
pub struct SceneProcessor {
    config: ComposeConfig,
    matting: Box<dyn MattingProvider>,
    background: Box<dyn BackgroundSource>,
}

impl std::fmt::Debug for SceneProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneProcessor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SceneProcessor {
    /// Build a processor from configuration
    ///
    /// Constructs the HTTP matting client and the background source chain
    /// (remote with procedural fallback when a token is configured,
    /// procedural-only otherwise).
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::InvalidConfig` when no matting endpoint is
    /// configured, or `SceneMergeError::Network` when an HTTP client cannot
    /// be built.
    pub fn from_config(config: ComposeConfig) -> Result<Self> {
        let endpoint = config.matting_endpoint.as_deref().ok_or_else(|| {
            SceneMergeError::invalid_config(
                "A matting endpoint is required; set one on the config or inject a provider",
            )
        })?;

        let matting = Box::new(HttpMattingClient::new(endpoint, config.request_timeout)?);
        let background = background::source_from_config(&config)?;

        Ok(Self {
            config,
            matting,
            background,
        })
    }

    /// Build a processor with injected providers
    ///
    /// The seam for tests and for embedders that bring their own matting or
    /// background capability.
    #[must_use]
    pub fn with_components(
        config: ComposeConfig,
        matting: Box<dyn MattingProvider>,
        background: Box<dyn BackgroundSource>,
    ) -> Self {
        Self {
            config,
            matting,
            background,
        }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Encode a result with the configured output format and JPEG quality
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Encode` if the encoder rejects the image.
    pub fn encode(&self, result: &CompositeResult) -> Result<Vec<u8>> {
        result.to_bytes(self.config.output_format, self.config.jpeg_quality)
    }

    /// Run the full pipeline on encoded image bytes
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Decode` for undecodable input,
    /// `SceneMergeError::Matting` when subject extraction fails, and
    /// `SceneMergeError::Compositing` only on internal invariant violations.
    #[instrument(skip(self, image_bytes), fields(label = %label, input_bytes = image_bytes.len()))]
    pub async fn process_bytes(
        &self,
        image_bytes: &[u8],
        label: &CharacterLabel,
    ) -> Result<CompositeResult> {
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::default();

        let matting_start = Instant::now();
        let subject = self.matting.extract_subject(image_bytes).await?;
        timings.matting_ms = matting_start.elapsed().as_millis() as u64;
        debug!(
            width = subject.width(),
            height = subject.height(),
            "Subject extracted"
        );

        self.compose(subject, label, timings, total_start).await
    }

    /// Run the pipeline from an async reader
    ///
    /// # Errors
    ///
    /// As `process_bytes`, plus `SceneMergeError::Decode` when the stream
    /// cannot be read.
    pub async fn process_reader<R: tokio::io::AsyncRead + Unpin>(
        &self,
        mut reader: R,
        label: &CharacterLabel,
    ) -> Result<CompositeResult> {
        use tokio::io::AsyncReadExt;

        let mut buffer = Vec::new();
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| SceneMergeError::decode(format!("failed to read input stream: {e}")))?;

        self.process_bytes(&buffer, label).await
    }

    /// Run the pipeline on an already-extracted subject
    ///
    /// Skips the matting stage; useful when the caller holds a pre-matted
    /// RGBA subject.
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Compositing` only on internal invariant
    /// violations.
    pub async fn compose_subject(
        &self,
        subject: RgbaImage,
        label: &CharacterLabel,
    ) -> Result<CompositeResult> {
        let total_start = Instant::now();
        let timings = ProcessingTimings::default();
        self.compose(subject, label, timings, total_start).await
    }

    async fn compose(
        &self,
        subject: RgbaImage,
        label: &CharacterLabel,
        mut timings: ProcessingTimings,
        total_start: Instant,
    ) -> Result<CompositeResult> {
        let dimensions = subject.dimensions();

        let background_start = Instant::now();
        let synthesized = self
            .background
            .synthesize(label, dimensions.0, dimensions.1)
            .await;
        timings.background_ms = background_start.elapsed().as_millis() as u64;

        let blend_start = Instant::now();
        let (composited, brightness_factor) = {
            let _span = span!(
                Level::DEBUG,
                "blend",
                width = dimensions.0,
                height = dimensions.1,
                origin = %synthesized.origin
            )
            .entered();

            let normalized = geometry::normalize_to_cover(&synthesized.image, dimensions);
            let brightness_factor = lighting::compute_brightness_factor(&subject, &normalized);
            debug!(brightness_factor, "Lighting analysis complete");
            if self.config.debug {
                debug!(
                    subject_brightness = lighting::mean_brightness_rgba(&subject),
                    background_brightness = lighting::mean_brightness_rgb(&normalized),
                    "Lighting detail"
                );
            }

            let params = BlendParameters::for_brightness(brightness_factor);
            let composited = compositor::composite(&subject, &normalized, &params)?;
            timings.blend_ms = blend_start.elapsed().as_millis() as u64;

            (composited, params.brightness_factor)
        };

        let postprocess_start = Instant::now();
        let final_image = postprocess::finalize(&composited);
        timings.postprocess_ms = postprocess_start.elapsed().as_millis() as u64;
        timings.total_ms = total_start.elapsed().as_millis() as u64;

        info!(
            label = %label,
            origin = %synthesized.origin,
            total_ms = timings.total_ms,
            "Scene composited"
        );

        let metadata = ProcessingMetadata {
            label: label.clone(),
            background_origin: synthesized.origin,
            brightness_factor,
            timings,
        };

        Ok(CompositeResult::new(final_image, metadata))
    }
}
