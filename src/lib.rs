//! sticker-renderer: image transformation core for a Telegram sticker bot
//!
//! This crate turns a photo into a square WebP sticker: it fits the photo
//! onto a transparent canvas, optionally masks it to a shape, applies one
//! named effect, draws a caption and encodes the result, then negotiates
//! the encoded size down to Telegram's limit.
//!
//! # Example
//!
//! ```
//! use sticker_renderer::{compose, fit_to_budget, StickerConfig};
//! use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
//! use std::io::Cursor;
//!
//! let photo = RgbaImage::from_pixel(120, 80, Rgba([200, 120, 40, 255]));
//! let mut png = Vec::new();
//! DynamicImage::ImageRgba8(photo)
//!     .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
//!     .unwrap();
//!
//! let config = StickerConfig::default();
//! let sticker = compose(&png, "vintage", "heart", "hello!", "bottom", 512, &config).unwrap();
//! // Re-encodes start from the composed sticker; the photo is only a fallback.
//! let sticker = fit_to_budget(sticker.into_bytes(), &png, config.max_bytes, &config).unwrap();
//! assert!(sticker.len() <= config.max_bytes);
//! ```
//!
//! # Layers
//!
//! For finer control, configure a [`StickerPipeline`] directly or through a
//! serializable [`StickerProfile`] with the [`Configurable`] trait:
//!
//! ```
//! use sticker_renderer::{
//!     Configurable, EffectKind, EffectSettings, StickerConfig, StickerPipeline, StickerProfile,
//! };
//!
//! let mut pipeline = StickerPipeline::new(StickerConfig::default()).unwrap();
//! let profile = StickerProfile::new()
//!     .with_effect(EffectSettings::new(EffectKind::Glow).with_strength(0.8));
//! pipeline.apply_profile(&profile).unwrap();
//!
//! let json = pipeline.export_profile().to_json().unwrap();
//! ```

mod budget;
mod codec;
mod config;
mod error;
mod layer;
mod pipeline;
mod profile;
mod sticker;

#[cfg(feature = "tokio")]
mod task;

pub use budget::{
    EncodeAttempt, MAX_QUALITY_ATTEMPTS, Negotiation, NegotiationStage, fit_to_budget, negotiate,
};
pub use codec::{LOSSLESS_QUALITY, decode, encode_webp, probe_size};
pub use config::StickerConfig;
pub use error::{Result, StickerError};
pub use layer::blend::BlendMode;
pub use layer::contain::contain;
pub use layer::effect::{NEON_MATRIX, SEPIA_MATRIX, apply_effect};
pub use layer::frame::apply_frame;
pub use layer::text::apply_text;
pub use layer::{
    EffectKind, EffectSpec, FrameSpec, Layer, LayerEffect, LayerPipeline, TextPosition, TextSpec,
};
pub use pipeline::{Configurable, StickerPipeline, StickerRequest, compose};
pub use profile::{EffectSettings, FrameSettings, StickerProfile, TextSettings};
pub use sticker::{EncodedSticker, SizePx, SourceImage};

#[cfg(feature = "tokio")]
pub use task::{compose_async, fit_to_budget_async};
