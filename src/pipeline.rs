//! Sticker composition engine.
//!
//! A [`StickerPipeline`] fits a photo onto the square canvas, runs the
//! configured layers and encodes the result. The free function [`compose`]
//! is the name-based entry point used by bot handlers.

use image::RgbaImage;

use crate::budget::{self, Negotiation};
use crate::codec::{self, LOSSLESS_QUALITY};
use crate::config::StickerConfig;
use crate::error::{Result, StickerError};
use crate::layer::contain::contain;
use crate::layer::{EffectSpec, FrameSpec, LayerPipeline, TextPosition, TextSpec};
use crate::profile::{EffectSettings, FrameSettings, StickerProfile, TextSettings};
use crate::sticker::{EncodedSticker, SizePx, SourceImage};

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from a [`StickerProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &StickerProfile) -> Result<()>;

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> StickerProfile;
}

// ============================================================================
// StickerRequest
// ============================================================================

/// Everything needed to turn one photo into one sticker.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerRequest {
    pub source: SourceImage,
    pub effect: Option<EffectSpec>,
    pub frame: Option<FrameSpec>,
    pub text: Option<TextSpec>,
    /// Upper bound on the encoded sticker size in bytes.
    pub max_bytes: usize,
}

impl StickerRequest {
    /// A request with no layers and the default size budget.
    pub fn new(source: SourceImage) -> Self {
        Self {
            source,
            effect: None,
            frame: None,
            text: None,
            max_bytes: crate::config::DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_effect(mut self, effect: Option<EffectSpec>) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_frame(mut self, frame: Option<FrameSpec>) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_text(mut self, text: Option<TextSpec>) -> Self {
        self.text = text;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Parses user-facing names and decodes the photo.
    ///
    /// Names are validated before any pixel work, so a typo fails fast.
    pub fn from_names(
        source_bytes: &[u8],
        effect_name: &str,
        frame_name: &str,
        text: &str,
        text_position: &str,
        config: &StickerConfig,
    ) -> Result<Self> {
        let effect = EffectSpec::from_name(effect_name)?;
        let frame = FrameSpec::from_name(frame_name)?;
        let position = TextPosition::from_name(text_position)?;
        let text = TextSpec::new(text, position, config.max_text_length)?;
        let source = SourceImage::from_bytes(source_bytes)?;

        Ok(Self::new(source)
            .with_effect(effect)
            .with_frame(frame)
            .with_text(text)
            .with_max_bytes(config.max_bytes))
    }
}

// ============================================================================
// StickerPipeline
// ============================================================================

/// Main sticker composition engine.
///
/// Access layers directly through the [`layers`](Self::layers) field to
/// configure them.
///
/// # Stage Order
///
/// 1. **Contain** - fit the photo onto a transparent square canvas
/// 2. **Frame** (`layers.frame`) - mask the canvas to a shape
/// 3. **Effect** (`layers.effect`) - whole-canvas transform
/// 4. **Text** (`layers.text`) - caption drawn over everything
/// 5. **Encode** - lossless WebP with alpha
///
/// # Example
///
/// ```
/// use sticker_renderer::{EffectSpec, FrameSpec, SourceImage, StickerConfig, StickerPipeline};
/// use image::{Rgba, RgbaImage};
///
/// let mut pipeline = StickerPipeline::new(StickerConfig::default()).unwrap();
/// pipeline.layers.frame.set_config(Some(FrameSpec::Circle));
/// pipeline.layers.effect.set_config(Some(EffectSpec::Sepia));
///
/// let photo = SourceImage::from_rgba(RgbaImage::from_pixel(64, 48, Rgba([90, 160, 30, 255])));
/// let sticker = pipeline.render(&photo, 128).unwrap();
/// assert_eq!((sticker.size.width, sticker.size.height), (128, 128));
/// ```
#[derive(Debug, Clone)]
pub struct StickerPipeline {
    config: StickerConfig,

    /// The layer pipeline. Access layers directly to configure them.
    pub layers: LayerPipeline,
}

impl StickerPipeline {
    /// Creates a pipeline with no layers configured.
    pub fn new(config: StickerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            layers: LayerPipeline::default(),
        })
    }

    /// Creates a pipeline with the layers a request asks for.
    pub fn for_request(request: &StickerRequest, config: StickerConfig) -> Result<Self> {
        let mut pipeline = Self::new(config)?;
        pipeline.layers.effect.set_config(request.effect.clone());
        pipeline.layers.frame.set_config(request.frame);
        pipeline.layers.text.set_config(request.text.clone());
        Ok(pipeline)
    }

    pub fn config(&self) -> &StickerConfig {
        &self.config
    }

    /// Runs every stage except the final encode.
    pub fn compose_raster(&self, source: &SourceImage, target_size: u32) -> Result<RgbaImage> {
        if target_size == 0 {
            return Err(StickerError::InvalidConfig(
                "target size must be positive".into(),
            ));
        }
        let canvas = contain(
            source.pixels().clone(),
            SizePx::square(target_size),
            self.config.allow_upscale,
        );
        self.layers.render(canvas)
    }

    /// Renders `source` into a `target_size` square sticker.
    pub fn render(&self, source: &SourceImage, target_size: u32) -> Result<EncodedSticker> {
        let raster = self.compose_raster(source, target_size)?;
        codec::encode_webp(&raster, LOSSLESS_QUALITY)
    }

    /// Renders at the configured canvas size and fits the result into
    /// `max_bytes`.
    pub fn process(&self, source: &SourceImage, max_bytes: usize) -> Result<Negotiation> {
        let raster = self.compose_raster(source, self.config.canvas_size)?;
        let encoded = codec::encode_webp(&raster, LOSSLESS_QUALITY)?;
        budget::negotiate(encoded, &raster, max_bytes, &self.config)
    }
}

impl Configurable for StickerPipeline {
    /// Applies a profile's settings to this pipeline.
    ///
    /// Effect parameters and caption length are validated here, so a
    /// profile that applies cleanly renders cleanly.
    fn apply_profile(&mut self, profile: &StickerProfile) -> Result<()> {
        // Validate everything before touching any layer.
        let effect = match &profile.effect {
            Some(settings) => {
                let spec = settings.to_spec();
                spec.validate()?;
                Some((spec, settings.enabled))
            }
            None => None,
        };
        let text = match &profile.text {
            Some(settings) => TextSpec::new(
                &settings.content,
                settings.position,
                self.config.max_text_length,
            )?
            .map(|spec| (spec, settings.enabled)),
            None => None,
        };

        match effect {
            Some((spec, enabled)) => {
                self.layers.effect.set_config(Some(spec));
                self.layers.effect.set_enabled(enabled);
            }
            None => self.layers.effect.set_config(None),
        }

        match profile.frame {
            Some(settings) => {
                self.layers.frame.set_config(Some(settings.shape));
                self.layers.frame.set_enabled(settings.enabled);
            }
            None => self.layers.frame.set_config(None),
        }

        match text {
            Some((spec, enabled)) => {
                self.layers.text.set_config(Some(spec));
                self.layers.text.set_enabled(enabled);
            }
            None => self.layers.text.set_config(None),
        }

        Ok(())
    }

    fn export_profile(&self) -> StickerProfile {
        let effect = self.layers.effect.config().map(|spec| EffectSettings {
            enabled: self.layers.effect.is_enabled(),
            ..EffectSettings::from(spec)
        });

        let frame = self.layers.frame.config().map(|shape| FrameSettings {
            shape: *shape,
            enabled: self.layers.frame.is_enabled(),
        });

        let text = self.layers.text.config().map(|spec| TextSettings {
            enabled: self.layers.text.is_enabled(),
            ..TextSettings::from(spec)
        });

        StickerProfile {
            effect,
            frame,
            text,
        }
    }
}

// ============================================================================
// Name-based entry point
// ============================================================================

/// Decodes `source_bytes` and composes a `target_size` square sticker.
///
/// `"none"` disables the effect or frame; blank `text` disables the
/// caption. Unknown names fail with the matching `Unknown*` error.
pub fn compose(
    source_bytes: &[u8],
    effect_name: &str,
    frame_name: &str,
    text: &str,
    text_position: &str,
    target_size: u32,
    config: &StickerConfig,
) -> Result<EncodedSticker> {
    let request = StickerRequest::from_names(
        source_bytes,
        effect_name,
        frame_name,
        text,
        text_position,
        config,
    )?;
    let pipeline = StickerPipeline::for_request(&request, config.clone())?;
    let sticker = pipeline.render(&request.source, target_size)?;
    log::debug!(
        "composed {}x{} sticker ({} bytes) with effect={effect_name} frame={frame_name}",
        sticker.size.width,
        sticker.size.height,
        sticker.len()
    );
    Ok(sticker)
}

// ============================================================================
// Tests
// ============================================================================
