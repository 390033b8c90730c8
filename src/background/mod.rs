//! Background synthesis keyed on a character label
//!
//! Two strategies implement the same infallible contract: a remote
//! text-to-image provider and a deterministic procedural gradient generator.
//! The remote strategy wraps the procedural one as its own failure handler,
//! so synthesis never fails; a degraded result is logged, not surfaced.

mod procedural;
mod remote;

pub use procedural::ProceduralGenerator;
pub use remote::RemoteGenerator;

use crate::config::ComposeConfig;
use crate::error::Result;
use crate::types::{CharacterLabel, SynthesizedBackground};
use async_trait::async_trait;

/// Source of themed background images
///
/// Implementations never fail: at minimum the procedural default gradient is
/// always available for any label and size.
#[async_trait]
pub trait BackgroundSource: Send + Sync {
    /// Produce a 3-channel background of the requested size for the label
    async fn synthesize(
        &self,
        label: &CharacterLabel,
        width: u32,
        height: u32,
    ) -> SynthesizedBackground;
}

/// Select a background source from configuration
///
/// The remote strategy is used when a provider token is configured,
/// otherwise synthesis is procedural-only. The choice is made once at
/// construction time; the remote source carries its own procedural fallback.
///
/// # Errors
///
/// Returns `SceneMergeError::Network` if the remote HTTP client cannot be
/// constructed.
pub fn source_from_config(config: &ComposeConfig) -> Result<Box<dyn BackgroundSource>> {
    match &config.api_token {
        Some(token) => {
            log::info!("Background synthesis: remote provider with procedural fallback");
            Ok(Box::new(RemoteGenerator::new(
                &config.generation_endpoint,
                token,
                config.request_timeout,
            )?))
        },
        None => {
            log::info!("Background synthesis: procedural generator (no provider token)");
            Ok(Box::new(ProceduralGenerator))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BackgroundOrigin;

    #[tokio::test]
    async fn test_source_without_token_is_procedural() {
        let config = ComposeConfig::default();
        let source = source_from_config(&config).unwrap();
        let bg = source
            .synthesize(&CharacterLabel::from("pikachu"), 32, 32)
            .await;
        assert_eq!(bg.origin, BackgroundOrigin::Procedural);
        assert_eq!(bg.image.dimensions(), (32, 32));
    }
}
