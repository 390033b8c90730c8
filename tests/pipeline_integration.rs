//! End-to-end pipeline tests with deterministic providers
//!
//! Exercises the full enhance -> blend -> post-process chain through the
//! public API, with a mock matting provider and controlled background
//! sources so every expected pixel value can be computed.

use async_trait::async_trait;
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use scenemerge::{
    background::{BackgroundSource, ProceduralGenerator},
    enhance,
    matting::MockMattingProvider,
    lighting, BackgroundOrigin, BlendParameters, CharacterLabel, ComposeConfig, SceneProcessor,
    SynthesizedBackground,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Background source returning a fixed solid color at any requested size
struct SolidBackground(Rgb<u8>);

#[async_trait]
impl BackgroundSource for SolidBackground {
    async fn synthesize(
        &self,
        _label: &CharacterLabel,
        width: u32,
        height: u32,
    ) -> SynthesizedBackground {
        SynthesizedBackground {
            image: RgbImage::from_pixel(width, height, self.0),
            origin: BackgroundOrigin::Procedural,
        }
    }
}

/// A 400x600 subject: opaque gray ellipse centered on a fully transparent
/// canvas, the classic matting output shape.
fn ellipse_subject(gray: u8) -> RgbaImage {
    let (width, height) = (400u32, 600u32);
    let (cx, cy) = (200.0f64, 300.0f64);
    let (rx, ry) = (120.0f64, 200.0f64);

    let mut subject = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for y in 0..height {
        for x in 0..width {
            let dx = (f64::from(x) - cx) / rx;
            let dy = (f64::from(y) - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                subject.put_pixel(x, y, Rgba([gray, gray, gray, 255]));
            }
        }
    }
    subject
}

#[tokio::test]
async fn ellipse_subject_on_dark_background() {
    init_tracing();
    let subject = ellipse_subject(200);
    let background_color = Rgb([10, 10, 10]);

    let processor = SceneProcessor::with_components(
        ComposeConfig::default(),
        Box::new(MockMattingProvider::with_subject(subject.clone())),
        Box::new(SolidBackground(background_color)),
    );

    let result = processor
        .process_bytes(b"ignored-by-mock", &CharacterLabel::from("batman"))
        .await
        .unwrap();

    assert_eq!(result.dimensions(), (400, 600));
    let output = result.image();

    // Far outside the ellipse the background passes through untouched: the
    // dark gray is a saturation fixed point and flat regions defeat the
    // sharpen threshold.
    for (x, y) in [(0, 0), (399, 0), (0, 599), (399, 599), (5, 5)] {
        assert_eq!(output.get_pixel(x, y), &background_color, "at ({x},{y})");
    }

    // The center pixel should match the enhanced subject. Predict it by
    // running the public enhancement pass on the same subject with the same
    // brightness factor the pipeline derived: the center is opaque, so the
    // blend passes the enhanced value straight through.
    let normalized = RgbImage::from_pixel(400, 600, background_color);
    let factor = lighting::compute_brightness_factor(&subject, &normalized);
    let params = BlendParameters::for_brightness(factor);

    let enhanced_subject = enhance::enhance_subject(&subject, &params);
    let expected = enhanced_subject.get_pixel(200, 300);

    let center = output.get_pixel(200, 300);
    for c in 0..3 {
        assert!(
            (i32::from(center[c]) - i32::from(expected[c])).abs() <= 2,
            "center channel {c}: got {}, expected about {}",
            center[c],
            expected[c]
        );
    }

    // Metadata reflects the request.
    assert_eq!(result.metadata.label.as_str(), "batman");
    assert_eq!(
        result.metadata.background_origin,
        BackgroundOrigin::Procedural
    );
    assert!((0.7..=1.3).contains(&result.metadata.brightness_factor));
}

#[tokio::test]
async fn dark_scene_dims_the_subject() {
    // A bright subject against a near-black scene must be corrected down,
    // and the correction must stop at the lower clamp.
    let subject = ellipse_subject(230);
    let normalized = RgbImage::from_pixel(400, 600, Rgb([5, 5, 5]));
    let factor = lighting::compute_brightness_factor(&subject, &normalized);
    assert_eq!(factor, 0.7);
}

#[tokio::test]
async fn unknown_label_gets_default_gradient_at_requested_size() {
    let source = ProceduralGenerator;
    let bg = source
        .synthesize(&CharacterLabel::from("unknown_hero"), 200, 200)
        .await;

    assert_eq!(bg.image.dimensions(), (200, 200));
    assert_eq!(bg.origin, BackgroundOrigin::Procedural);

    // Default theme: pale blue at the top, red channel ramping down by 50.
    assert_eq!(bg.image.get_pixel(0, 0), &Rgb([240, 248, 255]));
    assert_eq!(bg.image.get_pixel(199, 0), &Rgb([240, 248, 255]));
    let expected_bottom_r = (240.0 - 50.0 * (199.0 / 200.0)) as u8;
    assert_eq!(
        bg.image.get_pixel(0, 199),
        &Rgb([expected_bottom_r, 248, 255])
    );
}

#[tokio::test]
async fn fallback_backgrounds_are_byte_identical_across_calls() {
    let source = ProceduralGenerator;
    for label in ["pikachu", "naruto", "spiderman", "batman", "unknown_hero"] {
        let label = CharacterLabel::from(label);
        let first = source.synthesize(&label, 160, 90).await;
        let second = source.synthesize(&label, 160, 90).await;
        assert_eq!(
            first.image.as_raw(),
            second.image.as_raw(),
            "label {label} produced differing bytes"
        );
    }
}

#[tokio::test]
async fn background_smaller_than_subject_is_upscaled_to_cover() {
    // A tiny background must still yield a full-size composite.
    struct TinyBackground;

    #[async_trait]
    impl BackgroundSource for TinyBackground {
        async fn synthesize(
            &self,
            _label: &CharacterLabel,
            _width: u32,
            _height: u32,
        ) -> SynthesizedBackground {
            SynthesizedBackground {
                image: RgbImage::from_pixel(16, 16, Rgb([40, 80, 120])),
                origin: BackgroundOrigin::Procedural,
            }
        }
    }

    let subject = RgbaImage::from_pixel(300, 200, Rgba([128, 128, 128, 255]));
    let processor = SceneProcessor::with_components(
        ComposeConfig::default(),
        Box::new(MockMattingProvider::with_subject(subject)),
        Box::new(TinyBackground),
    );

    let result = processor
        .process_bytes(b"ignored", &CharacterLabel::from("pikachu"))
        .await
        .unwrap();
    assert_eq!(result.dimensions(), (300, 200));
}

#[tokio::test]
async fn finalize_changes_tone_but_not_geometry() {
    let subject = ellipse_subject(180);
    let processor = SceneProcessor::with_components(
        ComposeConfig::default(),
        Box::new(MockMattingProvider::with_subject(subject)),
        Box::new(SolidBackground(Rgb([60, 90, 130]))),
    );

    let result = processor
        .process_bytes(b"ignored", &CharacterLabel::from("naruto"))
        .await
        .unwrap();

    // The post-processor never changes dimensions or channel count, only
    // saturation and edge contrast; applying it again compounds sharpening.
    let once = result.image().clone();
    let twice = scenemerge::finalize(&once);
    assert_eq!(twice.dimensions(), once.dimensions());
    assert_ne!(twice.as_raw(), once.as_raw());
}
