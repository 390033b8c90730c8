//! Scale-to-cover background normalization
//!
//! Backgrounds arrive at whatever size the provider produced and must be
//! brought to the subject's exact pixel dimensions without distorting their
//! aspect ratio: uniform scale by the larger axis ratio, then a centered crop.

use image::{imageops, RgbImage};

/// Resize and crop a background to exactly `target` dimensions
///
/// The scale factor is `max(target_w / bg_w, target_h / bg_h)`, so the scaled
/// image covers the target rectangle in both dimensions before the centered
/// crop. A background smaller than the target in both dimensions is upscaled;
/// the output is never an undersized canvas.
#[must_use]
pub fn normalize_to_cover(background: &RgbImage, target: (u32, u32)) -> RgbImage {
    let (target_width, target_height) = target;
    let (bg_width, bg_height) = background.dimensions();

    if (bg_width, bg_height) == (target_width, target_height) {
        return background.clone();
    }

    let scale_w = f64::from(target_width) / f64::from(bg_width);
    let scale_h = f64::from(target_height) / f64::from(bg_height);
    let scale = scale_w.max(scale_h);

    // Ceil so rounding can never leave the scaled image short of the target.
    let scaled_width = ((f64::from(bg_width) * scale).ceil() as u32).max(target_width);
    let scaled_height = ((f64::from(bg_height) * scale).ceil() as u32).max(target_height);

    let resized = imageops::resize(
        background,
        scaled_width,
        scaled_height,
        imageops::FilterType::Lanczos3,
    );

    let left = (scaled_width - target_width) / 2;
    let top = (scaled_height - target_height) / 2;

    imageops::crop_imm(&resized, left, top, target_width, target_height).to_image()
}
