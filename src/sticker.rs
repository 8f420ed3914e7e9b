//! Value types flowing into and out of the sticker pipeline.
//!
//! A [`SourceImage`] is the decoded photo a request starts from; an
//! [`EncodedSticker`] is the finished buffer handed to the delivery layer.

use image::{DynamicImage, RgbaImage};

use crate::codec;
use crate::error::Result;

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns a square size with both sides equal to `side`.
    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Returns the shorter side.
    pub fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    ///
    /// Never grows past the original size unless `upscale` is set. Both
    /// sides are at least one pixel.
    pub fn fit_within(&self, bounds: SizePx, upscale: bool) -> SizePx {
        if self.width == 0 || self.height == 0 {
            return SizePx::new(1, 1);
        }
        let scale_x = bounds.width as f64 / self.width as f64;
        let scale_y = bounds.height as f64 / self.height as f64;
        let mut scale = scale_x.min(scale_y);
        if !upscale {
            scale = scale.min(1.0);
        }
        SizePx::new(
            ((self.width as f64 * scale).round() as u32).clamp(1, bounds.width.max(1)),
            ((self.height as f64 * scale).round() as u32).clamp(1, bounds.height.max(1)),
        )
    }
}

/// A decoded input photo.
///
/// Pixels are always held as RGBA8; `has_alpha` remembers whether the
/// original encoding carried an alpha channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
    has_alpha: bool,
}

impl SourceImage {
    /// Decodes any raster format the `image` crate was built with.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes).map(Self::from_dynamic)
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        let has_alpha = image.color().has_alpha();
        Self {
            pixels: image.into_rgba8(),
            has_alpha,
        }
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            has_alpha: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.pixels.width(), self.pixels.height())
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// 4 for RGBA inputs, 3 for RGB.
    pub fn channels(&self) -> u8 {
        if self.has_alpha { 4 } else { 3 }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// A finished, encoded sticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSticker {
    /// The encoded WebP bytes.
    pub bytes: Vec<u8>,

    /// Pixel dimensions of the encoded image.
    pub size: SizePx,

    /// Quality the buffer was encoded at.
    ///
    /// `None` when the buffer was accepted as-is without re-encoding.
    pub quality: Option<u8>,
}

impl EncodedSticker {
    pub fn new(bytes: Vec<u8>, size: SizePx, quality: Option<u8>) -> Self {
        Self {
            bytes,
            size,
            quality,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn size_px_is_square() {
        assert!(SizePx::new(100, 100).is_square());
        assert!(!SizePx::new(100, 200).is_square());
    }

    #[test]
    fn fit_within_preserves_aspect() {
        let fitted = SizePx::new(1000, 500).fit_within(SizePx::square(512), false);
        assert_eq!(fitted, SizePx::new(512, 256));
    }

    #[test]
    fn fit_within_never_upscales_by_default() {
        let fitted = SizePx::new(100, 50).fit_within(SizePx::square(512), false);
        assert_eq!(fitted, SizePx::new(100, 50));

        let upscaled = SizePx::new(100, 50).fit_within(SizePx::square(512), true);
        assert_eq!(upscaled, SizePx::new(512, 256));
    }

    #[test]
    fn fit_within_keeps_one_pixel_minimum() {
        let fitted = SizePx::new(4000, 2).fit_within(SizePx::square(100), false);
        assert_eq!(fitted.width, 100);
        assert_eq!(fitted.height, 1);
    }

    #[test]
    fn source_image_tracks_channels() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])));
        let source = SourceImage::from_dynamic(rgb);
        assert_eq!(source.channels(), 3);
        assert!(!source.has_alpha());
        assert_eq!(source.dimensions(), SizePx::new(4, 3));
        assert_eq!(source.pixels().get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn source_image_rejects_garbage() {
        assert!(SourceImage::from_bytes(b"definitely not an image").is_err());
    }
}
