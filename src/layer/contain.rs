//! "Contain" fitting of a photo onto the square sticker canvas.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::sticker::SizePx;

/// Fits `image` inside a transparent canvas of `canvas` size.
///
/// Aspect ratio is preserved and the result is centered. Images already
/// matching the canvas are returned untouched.
pub fn contain(image: RgbaImage, canvas: SizePx, upscale: bool) -> RgbaImage {
    let size = SizePx::new(image.width(), image.height());
    if size == canvas {
        return image;
    }

    let fitted = size.fit_within(canvas, upscale);
    let resized = if fitted == size {
        image
    } else {
        imageops::resize(&image, fitted.width, fitted.height, FilterType::Lanczos3)
    };

    let mut out = RgbaImage::new(canvas.width, canvas.height);
    let x = (canvas.width - fitted.width) / 2;
    let y = (canvas.height - fitted.height) / 2;
    imageops::replace(&mut out, &resized, i64::from(x), i64::from(y));
    out
}
