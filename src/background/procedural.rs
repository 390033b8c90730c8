//! Deterministic procedural background generation
//!
//! Each known label maps to a fixed vertical gradient: a top color triple
//! plus a per-channel delta applied linearly down the rows. The same label
//! and size always produce a byte-identical image, which keeps the fallback
//! path reproducible under test.

use super::BackgroundSource;
use crate::types::{BackgroundOrigin, CharacterLabel, SynthesizedBackground};
use async_trait::async_trait;
use image::{Rgb, RgbImage};

/// A vertical gradient theme: top color and per-channel delta to the bottom
#[derive(Debug, Clone, Copy)]
struct GradientTheme {
    top: [f32; 3],
    delta: [f32; 3],
}

/// Sky blue deepening downward, for the electric forest theme
const THEME_PIKACHU: GradientTheme = GradientTheme {
    top: [135.0, 206.0, 235.0],
    delta: [100.0, 0.0, 0.0],
};

/// Warm cream fading darker, for the hidden-village theme
const THEME_NARUTO: GradientTheme = GradientTheme {
    top: [255.0, 248.0, 220.0],
    delta: [-50.0, 0.0, 0.0],
};

/// Midnight blue lightening toward street level, for the city-night theme
const THEME_SPIDERMAN: GradientTheme = GradientTheme {
    top: [25.0, 25.0, 112.0],
    delta: [100.0, 100.0, 0.0],
};

/// Dark slate lifting to gray, for the gothic theme
const THEME_BATMAN: GradientTheme = GradientTheme {
    top: [47.0, 47.0, 47.0],
    delta: [80.0, 80.0, 80.0],
};

/// Neutral pale blue used for every unrecognized label
const THEME_DEFAULT: GradientTheme = GradientTheme {
    top: [240.0, 248.0, 255.0],
    delta: [-50.0, 0.0, 0.0],
};

fn theme_for(label: &CharacterLabel) -> GradientTheme {
    match label.as_str() {
        "pikachu" => THEME_PIKACHU,
        "naruto" => THEME_NARUTO,
        "spiderman" => THEME_SPIDERMAN,
        "batman" => THEME_BATMAN,
        _ => THEME_DEFAULT,
    }
}

/// Deterministic gradient background generator
pub struct ProceduralGenerator;

impl ProceduralGenerator {
    /// Render the gradient for a label at the requested size
    ///
    /// Row `y` of `height` gets `top + (y / height) * delta` per channel,
    /// clamped to the 8-bit range.
    #[must_use]
    pub fn generate(label: &CharacterLabel, width: u32, height: u32) -> RgbImage {
        let theme = theme_for(label);
        let mut image = RgbImage::new(width, height);

        for y in 0..height {
            let t = y as f32 / height as f32;
            let row_color = Rgb([
                (theme.top[0] + t * theme.delta[0]).clamp(0.0, 255.0) as u8,
                (theme.top[1] + t * theme.delta[1]).clamp(0.0, 255.0) as u8,
                (theme.top[2] + t * theme.delta[2]).clamp(0.0, 255.0) as u8,
            ]);
            for x in 0..width {
                image.put_pixel(x, y, row_color);
            }
        }

        image
    }
}

#[async_trait]
impl BackgroundSource for ProceduralGenerator {
    async fn synthesize(
        &self,
        label: &CharacterLabel,
        width: u32,
        height: u32,
    ) -> SynthesizedBackground {
        log::debug!("Generating procedural background for '{label}' at {width}x{height}");
        SynthesizedBackground {
            image: Self::generate(label, width, height),
            origin: BackgroundOrigin::Procedural,
        }
    }
}
