//! Output-size negotiation.
//!
//! Telegram rejects stickers over the byte limit, so an oversized encode
//! goes through a short, bounded search:
//!
//! 1. **Accept** - already within budget, returned unchanged.
//! 2. **QualityReduce** - re-encode the canvas at each quality of the
//!    configured ladder (90, 80, ... 30), stopping at the first fit.
//! 3. **DimensionReduce** - one encode of a smaller canvas at the floor
//!    quality. Its result is returned whether it fits or not.
//!
//! Missing the budget is logged, never an error.

use image::RgbaImage;

use crate::codec;
use crate::config::StickerConfig;
use crate::error::Result;
use crate::layer::contain::contain;
use crate::sticker::{EncodedSticker, SizePx};

/// Upper bound on quality re-encodes, whatever the ladder configuration.
pub const MAX_QUALITY_ATTEMPTS: usize = 7;

/// Stage of the negotiation that produced a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationStage {
    Accept,
    QualityReduce,
    DimensionReduce,
}

/// One re-encode performed while negotiating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeAttempt {
    pub stage: NegotiationStage,
    pub quality: u8,
    pub size: SizePx,
    pub bytes: usize,
}

impl EncodeAttempt {
    fn record(stage: NegotiationStage, quality: u8, sticker: &EncodedSticker) -> Self {
        Self {
            stage,
            quality,
            size: sticker.size,
            bytes: sticker.len(),
        }
    }
}

/// The chosen buffer together with every attempt made to get it.
#[derive(Debug, Clone, PartialEq)]
pub struct Negotiation {
    pub sticker: EncodedSticker,
    pub attempts: Vec<EncodeAttempt>,
    pub outcome: NegotiationStage,
    pub within_budget: bool,
}

/// Brings `encoded` under `max_bytes`, re-encoding from `source`.
///
/// `source` is contained into the configured canvas before the quality
/// stage, which is a no-op for an already composed canvas.
pub fn negotiate(
    encoded: EncodedSticker,
    source: &RgbaImage,
    max_bytes: usize,
    config: &StickerConfig,
) -> Result<Negotiation> {
    config.validate()?;

    if encoded.len() <= max_bytes {
        log::info!(
            "sticker accepted as-is: {} bytes (limit {max_bytes})",
            encoded.len()
        );
        return Ok(Negotiation {
            sticker: encoded,
            attempts: Vec::new(),
            outcome: NegotiationStage::Accept,
            within_budget: true,
        });
    }

    let mut attempts = Vec::with_capacity(MAX_QUALITY_ATTEMPTS + 1);

    let canvas = contain(
        source.clone(),
        SizePx::square(config.canvas_size),
        config.allow_upscale,
    );
    for quality in config.quality_ladder().take(MAX_QUALITY_ATTEMPTS) {
        let sticker = codec::encode_webp(&canvas, quality)?;
        attempts.push(EncodeAttempt::record(
            NegotiationStage::QualityReduce,
            quality,
            &sticker,
        ));
        log::debug!("quality {quality}: {} bytes", sticker.len());

        if sticker.len() <= max_bytes {
            log::info!(
                "sticker fits at quality {quality}: {} bytes after {} attempts",
                sticker.len(),
                attempts.len()
            );
            return Ok(Negotiation {
                sticker,
                attempts,
                outcome: NegotiationStage::QualityReduce,
                within_budget: true,
            });
        }
    }

    let fallback = contain(
        source.clone(),
        SizePx::square(config.fallback_size),
        config.allow_upscale,
    );
    let quality = config.quality_floor;
    let sticker = codec::encode_webp(&fallback, quality)?;
    attempts.push(EncodeAttempt::record(
        NegotiationStage::DimensionReduce,
        quality,
        &sticker,
    ));

    let within_budget = sticker.len() <= max_bytes;
    if within_budget {
        log::info!(
            "sticker fits at {}x{}: {} bytes",
            sticker.size.width,
            sticker.size.height,
            sticker.len()
        );
    } else {
        log::warn!(
            "sticker still {} bytes over budget after {} attempts, returning fallback",
            sticker.len() - max_bytes,
            attempts.len()
        );
    }

    Ok(Negotiation {
        sticker,
        attempts,
        outcome: NegotiationStage::DimensionReduce,
        within_budget,
    })
}

/// Byte-level entry point: returns a buffer no larger than `max_bytes`,
/// or the smallest fallback the loop could produce.
///
/// Re-encodes start from the composed sticker in `encoded`, so frames,
/// effects and captions survive. `source_bytes` is only decoded when
/// `encoded` itself cannot be.
pub fn fit_to_budget(
    encoded: Vec<u8>,
    source_bytes: &[u8],
    max_bytes: usize,
    config: &StickerConfig,
) -> Result<EncodedSticker> {
    config.validate()?;
    let size = codec::probe_size(&encoded).unwrap_or_default();
    let encoded = EncodedSticker::new(encoded, size, None);
    if encoded.len() <= max_bytes {
        return Ok(encoded);
    }

    let composed = match codec::decode(&encoded.bytes) {
        Ok(image) => image.into_rgba8(),
        Err(err) => {
            log::warn!("encoded sticker is unreadable ({err}), re-encoding from source");
            codec::decode(source_bytes)?.into_rgba8()
        }
    };
    negotiate(encoded, &composed, max_bytes, config).map(|negotiation| negotiation.sticker)
}
