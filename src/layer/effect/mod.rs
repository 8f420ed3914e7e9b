//! Named whole-canvas effects.
//!
//! An [`EffectSpec`] names one effect together with its parameters. The
//! "none" effect has no spec at all: [`EffectSpec::from_name`] returns
//! `Ok(None)` for it, and the pipeline skips the stage entirely.
//!
//! Every effect keeps the canvas dimensions and the alpha channel of the
//! image it is given.

mod color;
mod filter;
mod light;

pub use color::{NEON_MATRIX, SEPIA_MATRIX};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::LayerEffect;
use crate::error::{Result, StickerError};

// ============================================================================
// EffectKind
// ============================================================================

/// The recognized effect names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Grayscale,
    Sepia,
    Invert,
    Blur,
    Sharpen,
    Pixelate,
    Vintage,
    Neon,
    Gradient,
    Pearl,
    Glow,
    Sketch,
}

impl EffectKind {
    pub const ALL: [EffectKind; 12] = [
        Self::Grayscale,
        Self::Sepia,
        Self::Invert,
        Self::Blur,
        Self::Sharpen,
        Self::Pixelate,
        Self::Vintage,
        Self::Neon,
        Self::Gradient,
        Self::Pearl,
        Self::Glow,
        Self::Sketch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Invert => "invert",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Pixelate => "pixelate",
            Self::Vintage => "vintage",
            Self::Neon => "neon",
            Self::Gradient => "gradient",
            Self::Pearl => "pearl",
            Self::Glow => "glow",
            Self::Sketch => "sketch",
        }
    }

    /// Parses an effect name; `"none"` yields `Ok(None)`.
    pub fn parse(name: &str) -> Result<Option<Self>> {
        let normalized = name.trim().to_ascii_lowercase();
        if normalized == "none" {
            return Ok(None);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .map(Some)
            .ok_or_else(|| StickerError::UnknownEffect(name.to_string()))
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EffectSpec
// ============================================================================

pub const DEFAULT_BLUR_SIGMA: f32 = 3.0;
pub const DEFAULT_SHARPEN_SIGMA: f32 = 1.0;
pub const DEFAULT_SHARPEN_THRESHOLD: i32 = 2;
pub const DEFAULT_PIXELATE_FACTOR: u32 = 8;
pub const DEFAULT_VINTAGE_TINT: [u8; 3] = [240, 220, 180];
pub const DEFAULT_GRADIENT: ([u8; 3], [u8; 3]) = ([255, 0, 128], [0, 128, 255]);
pub const DEFAULT_GLOW_SIGMA: f32 = 8.0;
pub const DEFAULT_GLOW_STRENGTH: f32 = 0.6;
pub const DEFAULT_SKETCH_SIGMA: f32 = 5.0;

/// One effect and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectSpec {
    Grayscale,
    Sepia,
    Invert,
    /// Gaussian blur.
    Blur { sigma: f32 },
    /// Unsharp mask.
    Sharpen { sigma: f32, threshold: i32 },
    /// Downsample by `factor`, then scale back with nearest-neighbor.
    Pixelate { factor: u32 },
    /// Half-desaturated and multiplied by a warm tint.
    Vintage { tint: [u8; 3] },
    Neon,
    /// Diagonal linear gradient, overlay-blended.
    Gradient { from: [u8; 3], to: [u8; 3] },
    Pearl,
    /// Blurred white halo of the subject, screen-blended.
    Glow { sigma: f32, strength: f32 },
    /// Pencil sketch via color dodge of a blurred negative.
    Sketch { sigma: f32 },
}

impl EffectSpec {
    /// The spec for `kind` with default parameters.
    pub fn from_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Grayscale => Self::Grayscale,
            EffectKind::Sepia => Self::Sepia,
            EffectKind::Invert => Self::Invert,
            EffectKind::Blur => Self::Blur {
                sigma: DEFAULT_BLUR_SIGMA,
            },
            EffectKind::Sharpen => Self::Sharpen {
                sigma: DEFAULT_SHARPEN_SIGMA,
                threshold: DEFAULT_SHARPEN_THRESHOLD,
            },
            EffectKind::Pixelate => Self::Pixelate {
                factor: DEFAULT_PIXELATE_FACTOR,
            },
            EffectKind::Vintage => Self::Vintage {
                tint: DEFAULT_VINTAGE_TINT,
            },
            EffectKind::Neon => Self::Neon,
            EffectKind::Gradient => Self::Gradient {
                from: DEFAULT_GRADIENT.0,
                to: DEFAULT_GRADIENT.1,
            },
            EffectKind::Pearl => Self::Pearl,
            EffectKind::Glow => Self::Glow {
                sigma: DEFAULT_GLOW_SIGMA,
                strength: DEFAULT_GLOW_STRENGTH,
            },
            EffectKind::Sketch => Self::Sketch {
                sigma: DEFAULT_SKETCH_SIGMA,
            },
        }
    }

    /// Parses an effect name into its default spec; `"none"` yields `Ok(None)`.
    pub fn from_name(name: &str) -> Result<Option<Self>> {
        Ok(EffectKind::parse(name)?.map(Self::from_kind))
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Grayscale => EffectKind::Grayscale,
            Self::Sepia => EffectKind::Sepia,
            Self::Invert => EffectKind::Invert,
            Self::Blur { .. } => EffectKind::Blur,
            Self::Sharpen { .. } => EffectKind::Sharpen,
            Self::Pixelate { .. } => EffectKind::Pixelate,
            Self::Vintage { .. } => EffectKind::Vintage,
            Self::Neon => EffectKind::Neon,
            Self::Gradient { .. } => EffectKind::Gradient,
            Self::Pearl => EffectKind::Pearl,
            Self::Glow { .. } => EffectKind::Glow,
            Self::Sketch { .. } => EffectKind::Sketch,
        }
    }

    /// Rejects parameters no effect can work with. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        let name = self.kind().as_str();
        let positive_sigma = |sigma: f32| {
            if sigma.is_finite() && sigma > 0.0 {
                Ok(())
            } else {
                Err(StickerError::invalid_param(
                    name,
                    format!("sigma must be a positive number, got {sigma}"),
                ))
            }
        };

        match *self {
            Self::Blur { sigma } | Self::Sharpen { sigma, .. } | Self::Sketch { sigma } => {
                positive_sigma(sigma)
            }
            Self::Pixelate { factor: 0 } => Err(StickerError::invalid_param(
                name,
                "block factor must be at least 1",
            )),
            Self::Glow { sigma, strength } => {
                positive_sigma(sigma)?;
                if strength.is_finite() && strength > 0.0 && strength <= 1.0 {
                    Ok(())
                } else {
                    Err(StickerError::invalid_param(
                        name,
                        format!("strength must be in (0, 1], got {strength}"),
                    ))
                }
            }
            _ => Ok(()),
        }
    }
}

/// Applies `spec` to `image`, returning an image of the same dimensions.
pub fn apply_effect(image: RgbaImage, spec: &EffectSpec) -> Result<RgbaImage> {
    spec.validate()?;
    let out = match *spec {
        EffectSpec::Grayscale => color::grayscale(image),
        EffectSpec::Sepia => color::apply_matrix(image, &SEPIA_MATRIX),
        EffectSpec::Invert => color::invert(image),
        EffectSpec::Blur { sigma } => filter::blur(&image, sigma),
        EffectSpec::Sharpen { sigma, threshold } => filter::sharpen(&image, sigma, threshold),
        EffectSpec::Pixelate { factor } => filter::pixelate(&image, factor),
        EffectSpec::Vintage { tint } => color::vintage(image, tint),
        EffectSpec::Neon => color::apply_matrix(image, &NEON_MATRIX),
        EffectSpec::Gradient { from, to } => light::gradient(image, from, to)?,
        EffectSpec::Pearl => light::pearl(image)?,
        EffectSpec::Glow { sigma, strength } => light::glow(image, sigma, strength),
        EffectSpec::Sketch { sigma } => filter::sketch(image, sigma),
    };
    Ok(out)
}

impl LayerEffect for EffectSpec {
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn transform(&self, image: RgbaImage) -> Result<RgbaImage> {
        apply_effect(image, self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn photo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let alpha = if x < 2 { 0 } else { 255 };
            Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 120, alpha])
        })
    }

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::parse(kind.as_str()).unwrap(), Some(kind));
            assert_eq!(EffectSpec::from_kind(kind).kind(), kind);
        }
    }

    #[test]
    fn none_parses_to_no_spec() {
        assert_eq!(EffectSpec::from_name("none").unwrap(), None);
        assert_eq!(EffectSpec::from_name(" None ").unwrap(), None);
    }

    #[test]
    fn unknown_effect_is_an_error() {
        let err = EffectSpec::from_name("glitter").unwrap_err();
        assert!(matches!(err, StickerError::UnknownEffect(ref name) if name == "glitter"));
    }

    #[test]
    fn every_effect_keeps_dimensions_and_alpha() {
        let img = photo(40, 24);
        for kind in EffectKind::ALL {
            let out = apply_effect(img.clone(), &EffectSpec::from_kind(kind)).unwrap();
            assert_eq!(out.dimensions(), (40, 24), "{kind} changed dimensions");
            if !matches!(kind, EffectKind::Blur | EffectKind::Pixelate | EffectKind::Sharpen | EffectKind::Sketch) {
                assert_eq!(out.get_pixel(0, 0)[3], 0, "{kind} changed alpha");
                assert_eq!(out.get_pixel(20, 12)[3], 255, "{kind} changed alpha");
            }
        }
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let cases = [
            EffectSpec::Blur { sigma: 0.0 },
            EffectSpec::Blur { sigma: f32::NAN },
            EffectSpec::Sharpen {
                sigma: -1.0,
                threshold: 0,
            },
            EffectSpec::Pixelate { factor: 0 },
            EffectSpec::Glow {
                sigma: 4.0,
                strength: 1.5,
            },
            EffectSpec::Sketch { sigma: -2.0 },
        ];
        for spec in cases {
            let err = apply_effect(photo(8, 8), &spec).unwrap_err();
            assert!(
                matches!(err, StickerError::InvalidEffectParameter { .. }),
                "{spec:?} should be rejected"
            );
        }
    }

    #[test]
    fn default_specs_validate() {
        for kind in EffectKind::ALL {
            assert!(EffectSpec::from_kind(kind).validate().is_ok());
        }
    }
}
