//! Serializable sticker profile.
//!
//! A [`StickerProfile`] captures the effect, frame and caption choices of
//! one request in a JSON-friendly form, so a front end can store or send
//! them without depending on the layer types.
//!
//! # Example
//!
//! ```
//! use sticker_renderer::{EffectKind, EffectSettings, FrameSettings, FrameSpec, StickerProfile};
//!
//! let profile = StickerProfile::new()
//!     .with_effect(EffectSettings::new(EffectKind::Blur).with_sigma(5.0))
//!     .with_frame(FrameSettings::new(FrameSpec::Heart));
//!
//! let json = profile.to_json().unwrap();
//! let restored = StickerProfile::from_json(&json).unwrap();
//! assert_eq!(restored, profile);
//! ```

use serde::{Deserialize, Serialize};

use crate::layer::{EffectKind, EffectSpec, FrameSpec, TextPosition, TextSpec};

// ============================================================================
// Layer Settings (Serializable)
// ============================================================================

/// Serializable settings for the effect layer.
///
/// Parameters left out fall back to the effect's defaults. Parameters the
/// chosen effect does not take are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct EffectSettings {
    pub kind: EffectKind,

    /// Blur radius for blur, sharpen, glow and sketch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f32>,

    /// Unsharp-mask threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i32>,

    /// Pixelate block size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<u32>,

    /// Vintage tint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<[u8; 3]>,

    /// Gradient start and end colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<([u8; 3], [u8; 3])>,

    /// Glow opacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,

    /// Whether this layer is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl EffectSettings {
    /// Settings for `kind` with every parameter at its default.
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            sigma: None,
            threshold: None,
            factor: None,
            tint: None,
            colors: None,
            strength: None,
            enabled: true,
        }
    }

    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_factor(mut self, factor: u32) -> Self {
        self.factor = Some(factor);
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Builds the effect, overriding defaults with any parameters set here.
    pub fn to_spec(&self) -> EffectSpec {
        let mut spec = EffectSpec::from_kind(self.kind);
        match &mut spec {
            EffectSpec::Blur { sigma } | EffectSpec::Sketch { sigma } => {
                *sigma = self.sigma.unwrap_or(*sigma);
            }
            EffectSpec::Sharpen { sigma, threshold } => {
                *sigma = self.sigma.unwrap_or(*sigma);
                *threshold = self.threshold.unwrap_or(*threshold);
            }
            EffectSpec::Pixelate { factor } => *factor = self.factor.unwrap_or(*factor),
            EffectSpec::Vintage { tint } => *tint = self.tint.unwrap_or(*tint),
            EffectSpec::Gradient { from, to } => {
                if let Some((start, end)) = self.colors {
                    *from = start;
                    *to = end;
                }
            }
            EffectSpec::Glow { sigma, strength } => {
                *sigma = self.sigma.unwrap_or(*sigma);
                *strength = self.strength.unwrap_or(*strength);
            }
            EffectSpec::Grayscale
            | EffectSpec::Sepia
            | EffectSpec::Invert
            | EffectSpec::Neon
            | EffectSpec::Pearl => {}
        }
        spec
    }
}

impl From<&EffectSpec> for EffectSettings {
    fn from(spec: &EffectSpec) -> Self {
        let settings = Self::new(spec.kind());
        match *spec {
            EffectSpec::Blur { sigma } | EffectSpec::Sketch { sigma } => Self {
                sigma: Some(sigma),
                ..settings
            },
            EffectSpec::Sharpen { sigma, threshold } => Self {
                sigma: Some(sigma),
                threshold: Some(threshold),
                ..settings
            },
            EffectSpec::Pixelate { factor } => Self {
                factor: Some(factor),
                ..settings
            },
            EffectSpec::Vintage { tint } => Self {
                tint: Some(tint),
                ..settings
            },
            EffectSpec::Gradient { from, to } => Self {
                colors: Some((from, to)),
                ..settings
            },
            EffectSpec::Glow { sigma, strength } => Self {
                sigma: Some(sigma),
                strength: Some(strength),
                ..settings
            },
            _ => settings,
        }
    }
}

/// Serializable settings for the frame layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct FrameSettings {
    pub shape: FrameSpec,

    /// Whether this layer is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl FrameSettings {
    pub fn new(shape: FrameSpec) -> Self {
        Self {
            shape,
            enabled: true,
        }
    }
}

/// Serializable settings for the caption layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TextSettings {
    pub content: String,

    #[serde(default)]
    pub position: TextPosition,

    /// Whether this layer is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl TextSettings {
    pub fn new(content: impl Into<String>, position: TextPosition) -> Self {
        Self {
            content: content.into(),
            position,
            enabled: true,
        }
    }
}

impl From<&TextSpec> for TextSettings {
    fn from(spec: &TextSpec) -> Self {
        Self::new(spec.content(), spec.position())
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// StickerProfile
// ============================================================================

/// A serializable profile containing every layer choice for a sticker.
///
/// # JSON Format
///
/// ```json
/// {
///   "effect": { "kind": "glow", "sigma": 6.0, "enabled": true },
///   "frame": { "shape": "circle", "enabled": true },
///   "text": { "content": "hello", "position": "bottom", "enabled": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct StickerProfile {
    /// Effect layer settings. `None` means no effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<EffectSettings>,

    /// Frame layer settings. `None` means no frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<FrameSettings>,

    /// Caption settings. `None` means no caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextSettings>,
}

impl StickerProfile {
    /// Creates an empty profile with no layers configured.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, settings: EffectSettings) -> Self {
        self.effect = Some(settings);
        self
    }

    pub fn with_frame(mut self, settings: FrameSettings) -> Self {
        self.frame = Some(settings);
        self
    }

    pub fn with_text(mut self, settings: TextSettings) -> Self {
        self.text = Some(settings);
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
