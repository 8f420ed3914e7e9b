//! Separable blend modes for compositing generated overlays onto a photo.
//!
//! Each mode combines a base (backdrop) channel with an overlay channel;
//! the result is then mixed with the base by the overlay's alpha. The
//! base alpha is never changed, so blending cannot reveal padding.

use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Multiplies darks and screens lights depending on the base.
    Overlay,
    /// Inverse multiply; always lightens.
    Screen,
    /// Brightens the base to reflect the overlay.
    ColorDodge,
}

impl BlendMode {
    /// Blends two channel values in `[0, 1]`.
    pub fn channel(self, base: f32, top: f32) -> f32 {
        match self {
            Self::Overlay => {
                if base < 0.5 {
                    2.0 * base * top
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - top)
                }
            }
            Self::Screen => 1.0 - (1.0 - base) * (1.0 - top),
            Self::ColorDodge => {
                if top >= 1.0 {
                    1.0
                } else {
                    (base / (1.0 - top)).min(1.0)
                }
            }
        }
    }

    /// Blends a single overlay pixel onto a base pixel.
    pub fn pixel(self, base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
        let opacity = f32::from(top[3]) / 255.0;
        if opacity == 0.0 {
            return base;
        }
        let mix = |b: u8, t: u8| -> u8 {
            let bf = f32::from(b) / 255.0;
            let blended = self.channel(bf, f32::from(t) / 255.0);
            let out = bf + (blended - bf) * opacity;
            (out * 255.0).round().clamp(0.0, 255.0) as u8
        };
        Rgba([
            mix(base[0], top[0]),
            mix(base[1], top[1]),
            mix(base[2], top[2]),
            base[3],
        ])
    }
}

/// Blends `top` onto `base` pixel by pixel. Both must share dimensions.
pub fn blend_onto(mut base: RgbaImage, top: &RgbaImage, mode: BlendMode) -> RgbaImage {
    debug_assert_eq!(base.dimensions(), top.dimensions());
    for (b, t) in base.pixels_mut().zip(top.pixels()) {
        *b = mode.pixel(*b, *t);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_formula_branches() {
        assert!((BlendMode::Overlay.channel(0.25, 0.5) - 0.25).abs() < 1e-6);
        assert!((BlendMode::Overlay.channel(0.75, 0.5) - 0.75).abs() < 1e-6);
        assert!((BlendMode::Overlay.channel(0.75, 1.0) - 1.0).abs() < 1e-6);
        assert!(BlendMode::Overlay.channel(0.2, 0.0).abs() < 1e-6);
    }

    #[test]
    fn screen_never_darkens() {
        for base in [0.0, 0.3, 0.7, 1.0] {
            for top in [0.0, 0.5, 1.0] {
                assert!(BlendMode::Screen.channel(base, top) >= base - 1e-6);
            }
        }
        assert!((BlendMode::Screen.channel(0.5, 0.5) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn color_dodge_saturates() {
        assert_eq!(BlendMode::ColorDodge.channel(0.5, 1.0), 1.0);
        assert!((BlendMode::ColorDodge.channel(0.25, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn transparent_overlay_is_noop() {
        let base = Rgba([10, 200, 30, 128]);
        assert_eq!(BlendMode::Screen.pixel(base, Rgba([255, 255, 255, 0])), base);
    }

    #[test]
    fn base_alpha_is_preserved() {
        let base = Rgba([100, 100, 100, 40]);
        let out = BlendMode::Screen.pixel(base, Rgba([255, 255, 255, 255]));
        assert_eq!(out.0, [255, 255, 255, 40]);
    }
}
