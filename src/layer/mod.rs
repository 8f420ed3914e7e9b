//! Layer infrastructure for sticker composition.
//!
//! Each optional stage of the pipeline (frame, effect, text) is a
//! [`Layer`] holding an optional configuration. Configurations implement
//! [`LayerEffect`], a pure transform from one owned image to the next.
//!
//! # Architecture
//!
//! [`LayerPipeline::render`] folds the canvas through the stages in a
//! fixed order. An inactive layer hands the image through untouched.

pub mod blend;
pub mod contain;
pub mod effect;
pub mod frame;
pub mod svg;
pub mod text;

pub use effect::{EffectKind, EffectSpec};
pub use frame::FrameSpec;
pub use text::{TextPosition, TextSpec};

use image::RgbaImage;

use crate::error::Result;

// ============================================================================
// Layer Traits
// ============================================================================

/// Trait for layer configurations that know how to apply themselves.
///
/// Transforms take the image by value and return the next image; no
/// state is shared between stages.
pub trait LayerEffect {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Produces the next image. Dimensions must be preserved.
    fn transform(&self, image: RgbaImage) -> Result<RgbaImage>;
}

// ============================================================================
// Generic Layer
// ============================================================================

/// A pipeline slot with an optional configuration and an enabled flag.
///
/// The layer can be toggled off without losing its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<C> {
    config: Option<C>,
    enabled: bool,
}

impl<C> Default for Layer<C> {
    fn default() -> Self {
        Self {
            config: None,
            enabled: true,
        }
    }
}

impl<C> Layer<C> {
    pub fn new(config: Option<C>) -> Self {
        Self {
            config,
            enabled: true,
        }
    }

    /// Returns the current configuration, if any.
    pub fn config(&self) -> Option<&C> {
        self.config.as_ref()
    }

    /// Returns true if this layer is active (has config AND is enabled).
    pub fn is_active(&self) -> bool {
        self.enabled && self.config.is_some()
    }

    /// Returns true if the layer has a configuration set.
    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    /// Returns whether the layer is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets whether the layer is enabled.
    ///
    /// Returns true if the enabled state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: Option<C>) {
        self.config = config;
    }

    /// The configuration if the layer is active.
    pub fn active(&self) -> Option<&C> {
        if self.enabled { self.config.as_ref() } else { None }
    }
}

impl<C: LayerEffect> Layer<C> {
    /// Runs the layer, or passes `image` through if it is inactive.
    pub fn apply(&self, image: RgbaImage) -> Result<RgbaImage> {
        match self.active() {
            Some(config) => config.transform(image),
            None => Ok(image),
        }
    }
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// The optional stages applied after the canvas has been fitted.
///
/// ```text
/// contained canvas
///     │
///     ▼
/// ┌─────────┐
/// │  Frame  │  alpha mask (destination-in)
/// └────┬────┘
///      ▼
/// ┌─────────┐
/// │ Effect  │  whole-canvas transform
/// └────┬────┘
///      ▼
/// ┌─────────┐
/// │  Text   │  caption (source-over)
/// └─────────┘
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPipeline {
    pub frame: Layer<FrameSpec>,
    pub effect: Layer<EffectSpec>,
    pub text: Layer<TextSpec>,
}

impl LayerPipeline {
    /// Stage name and active transform, in application order.
    fn stages(&self) -> [(&'static str, Option<&dyn LayerEffect>); 3] {
        [
            ("frame", self.frame.active().map(|c| c as &dyn LayerEffect)),
            ("effect", self.effect.active().map(|c| c as &dyn LayerEffect)),
            ("text", self.text.active().map(|c| c as &dyn LayerEffect)),
        ]
    }

    /// Returns true if no stage would touch the canvas.
    pub fn is_identity(&self) -> bool {
        self.stages().iter().all(|(_, stage)| stage.is_none())
    }

    /// Folds `canvas` through every active stage.
    pub fn render(&self, canvas: RgbaImage) -> Result<RgbaImage> {
        self.stages()
            .into_iter()
            .try_fold(canvas, |image, (stage, transform)| match transform {
                Some(layer) => {
                    log::debug!("applying {stage} stage: {}", layer.name());
                    layer.transform(image)
                }
                None => {
                    log::debug!("skipping {stage} stage");
                    Ok(image)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn canvas() -> RgbaImage {
        RgbaImage::from_fn(32, 32, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 90, 255]))
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let pipeline = LayerPipeline::default();
        assert!(pipeline.is_identity());
        assert_eq!(pipeline.render(canvas()).unwrap(), canvas());
    }

    #[test]
    fn layer_toggle_without_losing_config() {
        let mut layer = Layer::new(Some(EffectSpec::Invert));
        assert!(layer.is_active());

        assert!(layer.set_enabled(false));
        assert!(!layer.is_active());
        assert!(layer.has_config());
        assert_eq!(layer.apply(canvas()).unwrap(), canvas());

        assert!(!layer.set_enabled(false));
        assert!(layer.set_enabled(true));
        assert_eq!(layer.config(), Some(&EffectSpec::Invert));
        assert_ne!(layer.apply(canvas()).unwrap(), canvas());
    }

    #[test]
    fn layer_without_config_is_inactive() {
        let layer: Layer<FrameSpec> = Layer::default();
        assert!(layer.is_enabled());
        assert!(!layer.is_active());
        assert!(layer.active().is_none());
    }

    #[test]
    fn frame_runs_before_effect() {
        let mut pipeline = LayerPipeline::default();
        pipeline.frame.set_config(Some(FrameSpec::Diamond));
        pipeline.effect.set_config(Some(EffectSpec::Invert));

        let out = pipeline.render(canvas()).unwrap();
        // The corner was masked to transparent black, then inverted to white
        // with alpha still zero.
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(out.get_pixel(16, 16)[3], 255);
    }

    #[test]
    fn stage_errors_propagate() {
        let mut pipeline = LayerPipeline::default();
        pipeline
            .effect
            .set_config(Some(EffectSpec::Pixelate { factor: 0 }));
        assert!(pipeline.render(canvas()).is_err());
    }
}
