#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Scenemerge
//!
//! Character-themed scene compositing: take a photo of a person, lift the
//! subject off its original background via an external matting provider,
//! synthesize a themed replacement background for a character label, and
//! blend the two into a single image with the subject's lighting matched to
//! the new scene.
//!
//! ## Pipeline
//!
//! 1. **Subject extraction** - an external matting capability returns the
//!    photo as RGBA with per-pixel subject opacity
//! 2. **Background synthesis** - remote text-to-image when a provider token
//!    is configured, with a deterministic procedural gradient as the
//!    always-available fallback
//! 3. **Geometry normalization** - scale-to-cover resize plus centered crop
//!    to the subject's exact dimensions
//! 4. **Lighting-aware blending** - a bounded brightness correction derived
//!    from the background's mean luma, then alpha-accurate compositing
//! 5. **Post-processing** - a finishing saturation and sharpen pass
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use scenemerge::{compose_scene_from_bytes, CharacterLabel, ComposeConfig};
//!
//! # async fn example(upload_bytes: Vec<u8>) -> anyhow::Result<()> {
//! let config = ComposeConfig::builder()
//!     .matting_endpoint("http://localhost:7000/matting")
//!     .build()?;
//!
//! let result =
//!     compose_scene_from_bytes(&upload_bytes, &CharacterLabel::from("pikachu"), config).await?;
//! result.save_png("output.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Provider injection
//!
//! Both external capabilities sit behind traits, so tests and embedders can
//! swap them out:
//!
//! ```rust,no_run
//! use scenemerge::{
//!     background::ProceduralGenerator, matting::MockMattingProvider, CharacterLabel,
//!     ComposeConfig, SceneProcessor,
//! };
//! use image::RgbaImage;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let subject = RgbaImage::new(400, 600);
//! let processor = SceneProcessor::with_components(
//!     ComposeConfig::default(),
//!     Box::new(MockMattingProvider::with_subject(subject)),
//!     Box::new(ProceduralGenerator),
//! );
//! let _result = processor
//!     .process_bytes(b"...", &CharacterLabel::from("batman"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod compositor;
pub mod config;
pub mod enhance;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod matting;
pub mod postprocess;
pub mod processor;
pub mod types;

// Internal imports for lib functions
use tokio::io::AsyncRead;

// Public API exports
pub use background::{BackgroundSource, ProceduralGenerator, RemoteGenerator};
pub use compositor::composite;
pub use config::{ComposeConfig, ComposeConfigBuilder, OutputFormat};
pub use error::{Result, SceneMergeError};
pub use geometry::normalize_to_cover;
pub use lighting::compute_brightness_factor;
pub use matting::{HttpMattingClient, MattingProvider, MockMattingProvider};
pub use postprocess::finalize;
pub use processor::SceneProcessor;
pub use types::{
    BackgroundOrigin, BlendParameters, CharacterLabel, CompositeResult, ProcessingMetadata,
    ProcessingTimings, SynthesizedBackground,
};

/// Compose a themed scene from encoded image bytes
///
/// One-shot convenience wrapper: builds a `SceneProcessor` from the config
/// and runs the full pipeline. For repeated requests, build the processor
/// once and reuse it.
///
/// # Errors
///
/// Returns `SceneMergeError` for undecodable input, matting provider
/// failures, or invalid configuration (a matting endpoint is required).
pub async fn compose_scene_from_bytes(
    image_bytes: &[u8],
    label: &CharacterLabel,
    config: ComposeConfig,
) -> Result<CompositeResult> {
    let processor = SceneProcessor::from_config(config)?;
    processor.process_bytes(image_bytes, label).await
}

/// Compose a themed scene from an async reader
///
/// Reads the stream to the end and delegates to `compose_scene_from_bytes`.
///
/// # Errors
///
/// As `compose_scene_from_bytes`, plus a decode error when the stream
/// cannot be read.
pub async fn compose_scene_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    label: &CharacterLabel,
    config: ComposeConfig,
) -> Result<CompositeResult> {
    use tokio::io::AsyncReadExt;

    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .await
        .map_err(|e| SceneMergeError::decode(format!("failed to read input stream: {e}")))?;

    compose_scene_from_bytes(&buffer, label, config).await
}

/// Compose a themed scene from an already-extracted RGBA subject
///
/// Skips the matting stage entirely; no matting endpoint is required.
///
/// # Errors
///
/// Returns `SceneMergeError` only on internal invariant violations or
/// invalid configuration.
pub async fn compose_scene_from_subject(
    subject: image::RgbaImage,
    label: &CharacterLabel,
    config: ComposeConfig,
) -> Result<CompositeResult> {
    let background = background::source_from_config(&config)?;
    let processor = SceneProcessor::with_components(
        config,
        Box::new(matting::NoMattingProvider),
        background,
    );
    processor.compose_subject(subject, label).await
}
