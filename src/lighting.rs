//! Lighting analysis for subject/background brightness matching

use image::{RgbImage, RgbaImage};

/// Lower bound on the brightness correction factor
pub const MIN_BRIGHTNESS_FACTOR: f32 = 0.7;

/// Upper bound on the brightness correction factor
pub const MAX_BRIGHTNESS_FACTOR: f32 = 1.3;

// ITU-R BT.601 luma weights, matching the usual RGB-to-grayscale conversion.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Mean luma of an RGB image, normalized to [0, 1]
#[must_use]
pub fn mean_brightness_rgb(image: &RgbImage) -> f32 {
    mean_luma(image.as_raw(), 3)
}

/// Mean luma of an RGBA image, normalized to [0, 1]
///
/// Alpha is ignored: transparent regions still contribute their color, the
/// same way a grayscale conversion of the unmatted photo would.
#[must_use]
pub fn mean_brightness_rgba(image: &RgbaImage) -> f32 {
    mean_luma(image.as_raw(), 4)
}

#[allow(clippy::indexing_slicing)] // Safe: chunks_exact guarantees at least 3 bytes
fn mean_luma(raw: &[u8], channels: usize) -> f32 {
    let pixel_count = raw.len() / channels;
    if pixel_count == 0 {
        return 0.0;
    }

    let sum: f64 = raw
        .chunks_exact(channels)
        .map(|px| {
            f64::from(
                LUMA_R * f32::from(px[0]) + LUMA_G * f32::from(px[1]) + LUMA_B * f32::from(px[2]),
            )
        })
        .sum();

    (sum / (pixel_count as f64 * 255.0)) as f32
}

/// Brightness correction factor for blending a subject into a background
///
/// The factor is `bg_brightness / subject_brightness` clamped to
/// [0.7, 1.3]; the bound keeps near-black or blown-out subjects from
/// producing extreme corrections. A fully black subject gets factor 1.0.
#[must_use]
pub fn compute_brightness_factor(subject: &RgbaImage, background: &RgbImage) -> f32 {
    let subject_brightness = mean_brightness_rgba(subject);
    let background_brightness = mean_brightness_rgb(background);

    if subject_brightness <= f32::EPSILON {
        return 1.0;
    }

    let factor = background_brightness / subject_brightness;
    factor.clamp(MIN_BRIGHTNESS_FACTOR, MAX_BRIGHTNESS_FACTOR)
}
