//! Color and sharpness adjustment passes
//!
//! The subject-enhancement pass runs before blending so the extracted person
//! matches the lighting of the synthesized scene: multiplicative brightness
//! (from the lighting matcher), a fixed contrast and saturation bump, and an
//! unsharp mask. The same saturation/unsharp primitives back the final
//! post-processing pass on the composited result.

use crate::types::BlendParameters;
use image::{imageops, RgbImage, RgbaImage};

// Luma weights for the saturation adjustment (BT.601, same as lighting).
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Apply the full subject-enhancement pass to an RGBA subject
///
/// Brightness scales each channel; contrast then pivots around the mean
/// grayscale value of the brightness-adjusted image, so a uniform subject is
/// a contrast fixed point; saturation scales around per-pixel luma; the
/// unsharp mask follows. The alpha channel passes through untouched in every
/// step.
#[must_use]
#[allow(clippy::indexing_slicing)] // Safe: chunks_exact(4) yields 4-byte pixels
pub fn enhance_subject(subject: &RgbaImage, params: &BlendParameters) -> RgbaImage {
    let (width, height) = subject.dimensions();

    let mut brightened = Vec::with_capacity(subject.as_raw().len());
    for px in subject.as_raw().chunks_exact(4) {
        for c in 0..3 {
            brightened.push(
                (f32::from(px[c]) * params.brightness_factor)
                    .round()
                    .clamp(0.0, 255.0) as u8,
            );
        }
        brightened.push(px[3]);
    }

    // Contrast pivot: mean grayscale of the image at this point in the
    // chain, alpha ignored.
    let pivot = mean_luma_rgba(&brightened);

    let mut adjusted = Vec::with_capacity(brightened.len());
    for px in brightened.chunks_exact(4) {
        let mut rgb = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
        for c in &mut rgb {
            *c = (*c - pivot) * params.contrast_factor + pivot;
        }
        let luma = LUMA_R * rgb[0] + LUMA_G * rgb[1] + LUMA_B * rgb[2];
        for c in &mut rgb {
            *c = luma + (*c - luma) * params.saturation_factor;
        }
        adjusted.extend_from_slice(&[
            rgb[0].round().clamp(0.0, 255.0) as u8,
            rgb[1].round().clamp(0.0, 255.0) as u8,
            rgb[2].round().clamp(0.0, 255.0) as u8,
            px[3],
        ]);
    }

    let adjusted = RgbaImage::from_raw(width, height, adjusted)
        .unwrap_or_else(|| subject.clone());

    unsharp_mask_rgba(
        &adjusted,
        params.sharpen_radius,
        params.sharpen_amount,
        params.sharpen_threshold,
    )
}

/// Scale the saturation of an RGB image around per-pixel luma
#[must_use]
#[allow(clippy::indexing_slicing)] // Safe: chunks_exact(3) yields 3-byte pixels
pub fn adjust_saturation(image: &RgbImage, factor: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = Vec::with_capacity(image.as_raw().len());

    for px in image.as_raw().chunks_exact(3) {
        let rgb = [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])];
        let luma = LUMA_R * rgb[0] + LUMA_G * rgb[1] + LUMA_B * rgb[2];
        for c in rgb {
            out.push((luma + (c - luma) * factor).round().clamp(0.0, 255.0) as u8);
        }
    }

    RgbImage::from_raw(width, height, out).unwrap_or_else(|| image.clone())
}

/// Unsharp mask on an RGB image
///
/// `amount` is a multiplier on the high-frequency difference (1.2 = 120%);
/// differences at or below `threshold` are left alone so flat regions do not
/// pick up noise.
#[must_use]
#[allow(clippy::indexing_slicing)] // Safe: chunks_exact(3) yields 3-byte pixels
pub fn unsharp_mask(image: &RgbImage, radius: f32, amount: f32, threshold: i32) -> RgbImage {
    if amount.abs() < f32::EPSILON || radius <= 0.0 {
        return image.clone();
    }

    let blurred = imageops::blur(image, radius);
    let (width, height) = image.dimensions();
    let mut out = Vec::with_capacity(image.as_raw().len());

    for (orig, blur) in image
        .as_raw()
        .chunks_exact(3)
        .zip(blurred.as_raw().chunks_exact(3))
    {
        for c in 0..3 {
            out.push(sharpen_channel(orig[c], blur[c], amount, threshold));
        }
    }

    RgbImage::from_raw(width, height, out).unwrap_or_else(|| image.clone())
}

#[allow(clippy::indexing_slicing)] // Safe: chunks_exact(4) yields 4-byte pixels
fn unsharp_mask_rgba(image: &RgbaImage, radius: f32, amount: f32, threshold: i32) -> RgbaImage {
    if amount.abs() < f32::EPSILON || radius <= 0.0 {
        return image.clone();
    }

    let blurred = imageops::blur(image, radius);
    let (width, height) = image.dimensions();
    let mut out = Vec::with_capacity(image.as_raw().len());

    for (orig, blur) in image
        .as_raw()
        .chunks_exact(4)
        .zip(blurred.as_raw().chunks_exact(4))
    {
        for c in 0..3 {
            out.push(sharpen_channel(orig[c], blur[c], amount, threshold));
        }
        out.push(orig[3]);
    }

    RgbaImage::from_raw(width, height, out).unwrap_or_else(|| image.clone())
}

/// Mean luma of a raw RGBA buffer in 8-bit units, alpha ignored
#[allow(clippy::indexing_slicing)] // Safe: chunks_exact(4) yields 4-byte pixels
fn mean_luma_rgba(raw: &[u8]) -> f32 {
    let pixel_count = raw.len() / 4;
    if pixel_count == 0 {
        return 0.0;
    }
    let sum: f64 = raw
        .chunks_exact(4)
        .map(|px| {
            f64::from(
                LUMA_R * f32::from(px[0]) + LUMA_G * f32::from(px[1]) + LUMA_B * f32::from(px[2]),
            )
        })
        .sum();
    (sum / pixel_count as f64) as f32
}

#[inline]
fn sharpen_channel(orig: u8, blurred: u8, amount: f32, threshold: i32) -> u8 {
    let diff = i32::from(orig) - i32::from(blurred);
    if diff.abs() <= threshold {
        return orig;
    }
    (f32::from(orig) + amount * diff as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}
