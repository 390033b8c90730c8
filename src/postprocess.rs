//! Final color and sharpening pass on the composited result

use crate::enhance;
use image::RgbImage;

/// Saturation multiplier for the final pass
pub const FINAL_SATURATION: f32 = 1.05;

/// Unsharp mask radius for the final pass (pixels)
pub const FINAL_SHARPEN_RADIUS: f32 = 1.0;

/// Unsharp mask amount for the final pass (1.2 = 120%)
pub const FINAL_SHARPEN_AMOUNT: f32 = 1.2;

/// Unsharp mask threshold for the final pass (8-bit channel units)
pub const FINAL_SHARPEN_THRESHOLD: i32 = 3;

/// Apply the finishing saturation and sharpen pass
///
/// Pure function over the composited image: saturation ×1.05 followed by a
/// gentle unsharp mask. Dimensions and channel count are unchanged. Not
/// idempotent, since sharpening compounds on repeated application.
#[must_use]
pub fn finalize(image: &RgbImage) -> RgbImage {
    let saturated = enhance::adjust_saturation(image, FINAL_SATURATION);
    enhance::unsharp_mask(
        &saturated,
        FINAL_SHARPEN_RADIUS,
        FINAL_SHARPEN_AMOUNT,
        FINAL_SHARPEN_THRESHOLD,
    )
}
