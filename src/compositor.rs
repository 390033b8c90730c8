//! Alpha-accurate blending of the enhanced subject over the background
//!
//! The blend is expressed as whole-array arithmetic over stacked channel
//! planes rather than a per-pixel scalar loop. A pixel-loop paste fallback
//! covers the case where the planar views cannot be constructed; it produces
//! the same linear-interpolation semantics, just without the batched math.

use crate::enhance;
use crate::error::{Result, SceneMergeError};
use crate::types::BlendParameters;
use image::{RgbImage, RgbaImage};
use ndarray::{s, ArrayView3};

/// Composite an RGBA subject over an RGB background of the same size
///
/// The subject is enhanced first (brightness from the lighting matcher,
/// fixed contrast/saturation/sharpen), then blended per pixel:
/// `out = subject * alpha + background * (1 - alpha)` with float
/// accumulation, rounded and clamped back to 8-bit. The output is always
/// 3-channel at the input dimensions.
///
/// # Errors
///
/// Returns `SceneMergeError::Compositing` when subject and background
/// dimensions differ; the caller must normalize the background first.
pub fn composite(
    subject: &RgbaImage,
    background: &RgbImage,
    params: &BlendParameters,
) -> Result<RgbImage> {
    if subject.dimensions() != background.dimensions() {
        return Err(SceneMergeError::compositing(format!(
            "subject is {}x{} but background is {}x{}",
            subject.width(),
            subject.height(),
            background.width(),
            background.height()
        )));
    }

    let enhanced = enhance::enhance_subject(subject, params);

    match blend_planar(&enhanced, background) {
        Ok(blended) => Ok(blended),
        Err(e) => {
            log::warn!("Planar blend unavailable ({e}); using paste fallback");
            Ok(paste_with_mask(&enhanced, background))
        },
    }
}

/// Vectorized blend over (height, width, channel) planes
fn blend_planar(subject: &RgbaImage, background: &RgbImage) -> Result<RgbImage> {
    let (width, height) = subject.dimensions();
    let (h, w) = (height as usize, width as usize);

    let fg = ArrayView3::from_shape((h, w, 4), subject.as_raw())
        .map_err(|e| SceneMergeError::compositing(format!("subject buffer shape: {e}")))?;
    let bg = ArrayView3::from_shape((h, w, 3), background.as_raw())
        .map_err(|e| SceneMergeError::compositing(format!("background buffer shape: {e}")))?;

    let fg = fg.mapv(f32::from);
    let bg = bg.mapv(f32::from);

    let alpha = fg.slice(s![.., .., 3..4]).to_owned() / 255.0;
    let inv_alpha = 1.0 - &alpha;
    let fg_rgb = fg.slice(s![.., .., 0..3]);

    // (h, w, 1) alpha planes broadcast across the three color channels.
    let blended = &fg_rgb * &alpha + &bg * &inv_alpha;

    let data: Vec<u8> = blended
        .iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();

    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| SceneMergeError::compositing("blended buffer has wrong length"))
}

/// Scalar paste-with-mask fallback, same interpolation semantics
fn paste_with_mask(subject: &RgbaImage, background: &RgbImage) -> RgbImage {
    let mut result = background.clone();

    for (x, y, pixel) in result.enumerate_pixels_mut() {
        let fg = subject.get_pixel(x, y);
        let alpha = f32::from(fg[3]) / 255.0;
        if alpha > 0.0 {
            for c in 0..3 {
                let blended =
                    f32::from(fg[c]) * alpha + f32::from(pixel[c]) * (1.0 - alpha);
                pixel[c] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba};

    fn neutral_params() -> BlendParameters {
        // Identity enhancement so blend arithmetic can be checked directly.
        BlendParameters {
            brightness_factor: 1.0,
            contrast_factor: 1.0,
            saturation_factor: 1.0,
            sharpen_radius: 1.0,
            sharpen_amount: 0.0,
            sharpen_threshold: 3,
        }
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let subject = RgbaImage::new(10, 10);
        let background = RgbImage::new(10, 12);
        let err = composite(&subject, &background, &neutral_params()).unwrap_err();
        assert!(matches!(err, SceneMergeError::Compositing { .. }));
    }

    #[test]
    fn test_transparent_subject_passes_background_through() {
        let subject = RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 0]));
        let background = RgbImage::from_pixel(16, 16, Rgb([10, 10, 10]));
        let result = composite(&subject, &background, &neutral_params()).unwrap();
        assert_eq!(result, background);
    }

    #[test]
    fn test_opaque_subject_replaces_background() {
        let subject = RgbaImage::from_pixel(16, 16, Rgba([200, 150, 100, 255]));
        let background = RgbImage::from_pixel(16, 16, Rgb([10, 10, 10]));
        let result = composite(&subject, &background, &neutral_params()).unwrap();
        for px in result.pixels() {
            assert_eq!(px, &Rgb([200, 150, 100]));
        }
    }

    #[test]
    fn test_half_alpha_interpolates_linearly() {
        let subject = RgbaImage::from_pixel(8, 8, Rgba([200, 100, 0, 128]));
        let background = RgbImage::from_pixel(8, 8, Rgb([0, 100, 200]));
        let result = composite(&subject, &background, &neutral_params()).unwrap();

        let alpha = 128.0f32 / 255.0;
        let px = result.get_pixel(4, 4);
        for c in 0..3 {
            let subject_c = [200.0, 100.0, 0.0][c];
            let bg_c = [0.0, 100.0, 200.0][c];
            let expected = (subject_c * alpha + bg_c * (1.0 - alpha)).round() as i32;
            assert!((i32::from(px[c]) - expected).abs() <= 1);
        }
    }

    #[test]
    fn test_paste_fallback_matches_planar_blend() {
        let mut subject = RgbaImage::from_pixel(10, 10, Rgba([180, 90, 40, 255]));
        for y in 0..10 {
            for x in 0..5 {
                subject.put_pixel(x, y, Rgba([180, 90, 40, 64]));
            }
        }
        let background = RgbImage::from_pixel(10, 10, Rgb([30, 60, 90]));

        let planar = blend_planar(&subject, &background).unwrap();
        let pasted = paste_with_mask(&subject, &background);

        for (a, b) in planar.pixels().zip(pasted.pixels()) {
            for c in 0..3 {
                assert!((i32::from(a[c]) - i32::from(b[c])).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_output_dimensions_match_input() {
        let subject = RgbaImage::new(33, 47);
        let background = RgbImage::new(33, 47);
        let result = composite(&subject, &background, &neutral_params()).unwrap();
        assert_eq!(result.dimensions(), (33, 47));
    }
}
