//! Tunable limits for sticker rendering and size negotiation.
//!
//! All fields default to the values the Telegram sticker format expects,
//! so an empty JSON object is a valid configuration:
//!
//! ```
//! use sticker_renderer::StickerConfig;
//!
//! let config = StickerConfig::from_json("{}").unwrap();
//! assert_eq!(config.canvas_size, 512);
//! assert_eq!(config.max_bytes, 512 * 1024);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, StickerError};

pub const DEFAULT_CANVAS_SIZE: u32 = 512;
pub const DEFAULT_MAX_BYTES: usize = 512 * 1024;
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 50;
pub const DEFAULT_QUALITY_START: u8 = 90;
pub const DEFAULT_QUALITY_FLOOR: u8 = 30;
pub const DEFAULT_QUALITY_STEP: u8 = 10;
pub const DEFAULT_FALLBACK_SIZE: u32 = 400;

/// Read-only configuration shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct StickerConfig {
    /// Side length of the square sticker canvas in pixels.
    pub canvas_size: u32,

    /// Maximum encoded size of the final sticker in bytes.
    pub max_bytes: usize,

    /// Maximum number of characters accepted for the text overlay.
    pub max_text_length: usize,

    /// First quality tried when the lossless encode is over budget.
    pub quality_start: u8,

    /// Lowest quality the negotiation loop will request.
    pub quality_floor: u8,

    /// Amount subtracted from the quality between attempts.
    pub quality_step: u8,

    /// Canvas size used by the one-shot dimension fallback.
    pub fallback_size: u32,

    /// Whether sources smaller than the canvas are scaled up to fill it.
    pub allow_upscale: bool,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            max_bytes: DEFAULT_MAX_BYTES,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            quality_start: DEFAULT_QUALITY_START,
            quality_floor: DEFAULT_QUALITY_FLOOR,
            quality_step: DEFAULT_QUALITY_STEP,
            fallback_size: DEFAULT_FALLBACK_SIZE,
            allow_upscale: false,
        }
    }
}

impl StickerConfig {
    /// Checks that the limits describe a loop that can terminate.
    pub fn validate(&self) -> Result<()> {
        if self.canvas_size == 0 || self.fallback_size == 0 {
            return Err(StickerError::InvalidConfig(
                "canvas sizes must be positive".into(),
            ));
        }
        if self.quality_step == 0 {
            return Err(StickerError::InvalidConfig(
                "quality step must be positive".into(),
            ));
        }
        if self.quality_floor == 0 || self.quality_floor > self.quality_start {
            return Err(StickerError::InvalidConfig(format!(
                "quality floor {} must be in 1..={}",
                self.quality_floor, self.quality_start
            )));
        }
        if self.quality_start > 100 {
            return Err(StickerError::InvalidConfig(format!(
                "quality start {} exceeds 100",
                self.quality_start
            )));
        }
        Ok(())
    }

    /// Qualities tried by the negotiation loop, highest first.
    pub fn quality_ladder(&self) -> impl Iterator<Item = u8> + use<> {
        let floor = self.quality_floor;
        let step = self.quality_step.max(1);
        std::iter::successors(Some(self.quality_start), move |q| q.checked_sub(step))
            .take_while(move |q| *q >= floor)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_sticker_limits() {
        let config = StickerConfig::default();
        assert_eq!(config.canvas_size, 512);
        assert_eq!(config.max_bytes, 524_288);
        assert_eq!(config.max_text_length, 50);
        assert_eq!(config.quality_floor, 30);
        assert_eq!(config.quality_step, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn quality_ladder_stops_at_floor() {
        let ladder: Vec<u8> = StickerConfig::default().quality_ladder().collect();
        assert_eq!(ladder, vec![90, 80, 70, 60, 50, 40, 30]);
    }

    #[test]
    fn quality_ladder_does_not_underflow() {
        let config = StickerConfig {
            quality_start: 25,
            quality_floor: 5,
            quality_step: 10,
            ..StickerConfig::default()
        };
        let ladder: Vec<u8> = config.quality_ladder().collect();
        assert_eq!(ladder, vec![25, 15, 5]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StickerConfig::from_json(r#"{"maxTextLength": 20}"#).unwrap();
        assert_eq!(config.max_text_length, 20);
        assert_eq!(config.canvas_size, 512);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"maxTextLength\":20"));
        assert!(json.contains("\"allowUpscale\":false"));
    }

    #[test]
    fn validate_rejects_zero_step() {
        let config = StickerConfig {
            quality_step: 0,
            ..StickerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StickerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_floor_above_start() {
        let config = StickerConfig {
            quality_floor: 95,
            ..StickerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
