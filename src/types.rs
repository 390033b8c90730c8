//! Core types shared across the compositing pipeline

use crate::config::OutputFormat;
use crate::error::{Result, SceneMergeError};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

/// Opaque key selecting a background theme
///
/// Labels are never validated: an unrecognized label silently selects the
/// default theme rather than producing an error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterLabel(String);

impl CharacterLabel {
    /// Create a label from any string-like value
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self(label.into())
    }

    /// The raw label string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CharacterLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl std::fmt::Display for CharacterLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a synthesized background came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackgroundOrigin {
    /// Produced by the remote text-to-image provider
    Remote,
    /// Produced by the deterministic procedural generator
    Procedural,
}

impl std::fmt::Display for BackgroundOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Procedural => write!(f, "procedural"),
        }
    }
}

/// A synthesized background image together with its origin marker
///
/// The origin lets callers observe degraded synthesis (remote generation
/// fell back to procedural) without turning the fallback into an error.
#[derive(Debug, Clone)]
pub struct SynthesizedBackground {
    /// The 3-channel background image
    pub image: RgbImage,
    /// Which strategy produced the image
    pub origin: BackgroundOrigin,
}

/// Per-request blend parameters, derived and discarded
///
/// Only the brightness factor is computed per request (from the lighting
/// matcher); the remaining factors are fixed pipeline constants.
#[derive(Debug, Clone, Copy)]
pub struct BlendParameters {
    /// Brightness multiplier for the subject, clamped to [0.7, 1.3]
    pub brightness_factor: f32,
    /// Contrast multiplier applied to the subject
    pub contrast_factor: f32,
    /// Saturation multiplier applied to the subject before blending
    pub saturation_factor: f32,
    /// Unsharp mask blur radius in pixels
    pub sharpen_radius: f32,
    /// Unsharp mask amount (1.5 = 150%)
    pub sharpen_amount: f32,
    /// Unsharp mask threshold in 8-bit channel units
    pub sharpen_threshold: i32,
}

impl BlendParameters {
    /// Blend parameters for a computed brightness factor, with the fixed
    /// contrast/saturation/sharpen constants of the subject-enhancement pass
    #[must_use]
    pub fn for_brightness(brightness_factor: f32) -> Self {
        Self {
            brightness_factor: brightness_factor.clamp(0.7, 1.3),
            contrast_factor: 1.1,
            saturation_factor: 1.05,
            sharpen_radius: 1.0,
            sharpen_amount: 1.5,
            sharpen_threshold: 3,
        }
    }
}

impl Default for BlendParameters {
    fn default() -> Self {
        Self::for_brightness(1.0)
    }
}

/// Timing breakdown for the pipeline stages (milliseconds)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Subject extraction (matting provider round trip)
    pub matting_ms: u64,
    /// Background synthesis (remote call or procedural generation)
    pub background_ms: u64,
    /// Lighting analysis, enhancement, and alpha blend
    pub blend_ms: u64,
    /// Final saturation/sharpen pass
    pub postprocess_ms: u64,
    /// End-to-end wall time
    pub total_ms: u64,
}

/// Metadata describing a completed compositing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetadata {
    /// Label the background theme was keyed on
    pub label: CharacterLabel,
    /// Which strategy produced the background
    pub background_origin: BackgroundOrigin,
    /// Brightness factor applied to the subject
    pub brightness_factor: f32,
    /// Stage timing breakdown
    pub timings: ProcessingTimings,
}

/// Final artifact of the compositing pipeline
///
/// Holds the composited 3-channel image plus request metadata, with helpers
/// for encoding to the supported output formats.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    image: RgbImage,
    /// Metadata for the request that produced this result
    pub metadata: ProcessingMetadata,
}

impl CompositeResult {
    /// Wrap a composited image with its metadata
    #[must_use]
    pub fn new(image: RgbImage, metadata: ProcessingMetadata) -> Self {
        Self { image, metadata }
    }

    /// Output dimensions as (width, height)
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Borrow the composited image
    #[must_use]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Consume the result, returning the composited image
    #[must_use]
    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Encode the composited image to bytes in the given format
    ///
    /// Quality applies to JPEG only (0-100); PNG and WebP encoding here are
    /// lossless.
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Encode` if the encoder rejects the image.
    pub fn to_bytes(&self, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            OutputFormat::Png => {
                self.image
                    .write_to(&mut buffer, image::ImageFormat::Png)?;
            },
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
                self.image.write_with_encoder(encoder)?;
            },
            OutputFormat::WebP => {
                self.image
                    .write_to(&mut buffer, image::ImageFormat::WebP)?;
            },
        }
        Ok(buffer.into_inner())
    }

    /// Save the composited image as a PNG file
    ///
    /// # Errors
    ///
    /// Returns `SceneMergeError::Encode` on encoding failure or
    /// `SceneMergeError::FileIo` when the file cannot be written.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes(OutputFormat::Png, 100)?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| SceneMergeError::file_io_error("write output image", path.as_ref(), e))
    }

    /// View the result as a `DynamicImage` (copies the buffer)
    #[must_use]
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_label_roundtrip() {
        let label = CharacterLabel::from("pikachu");
        assert_eq!(label.as_str(), "pikachu");
        assert_eq!(label.to_string(), "pikachu");
    }

    #[test]
    fn test_blend_parameters_clamped() {
        assert_eq!(BlendParameters::for_brightness(5.0).brightness_factor, 1.3);
        assert_eq!(BlendParameters::for_brightness(0.1).brightness_factor, 0.7);
        assert_eq!(BlendParameters::for_brightness(1.0).brightness_factor, 1.0);
    }

    #[test]
    fn test_result_to_png_bytes() {
        let image = RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]));
        let metadata = ProcessingMetadata {
            label: CharacterLabel::from("batman"),
            background_origin: BackgroundOrigin::Procedural,
            brightness_factor: 1.0,
            timings: ProcessingTimings::default(),
        };
        let result = CompositeResult::new(image, metadata);

        let bytes = result.to_bytes(OutputFormat::Png, 100).unwrap();
        // PNG magic header
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_result_to_jpeg_bytes() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([200, 100, 50]));
        let metadata = ProcessingMetadata {
            label: CharacterLabel::from("naruto"),
            background_origin: BackgroundOrigin::Procedural,
            brightness_factor: 1.1,
            timings: ProcessingTimings::default(),
        };
        let result = CompositeResult::new(image, metadata);

        let bytes = result.to_bytes(OutputFormat::Jpeg, 90).unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
