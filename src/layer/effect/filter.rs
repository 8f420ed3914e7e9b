//! Neighborhood filters: blur, sharpen, pixelate and sketch.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use super::color;
use crate::layer::blend::{BlendMode, blend_onto};
use crate::layer::svg::{premultiply, unpremultiply};

/// Runs `filter` on premultiplied pixels so transparent areas carry no
/// color into their neighbors.
fn premultiplied(image: &RgbaImage, filter: impl FnOnce(&RgbaImage) -> RgbaImage) -> RgbaImage {
    let mut scaled = image.clone();
    for pixel in scaled.pixels_mut() {
        let (r, g, b, a) = premultiply(pixel[0], pixel[1], pixel[2], pixel[3]);
        pixel.0 = [r, g, b, a];
    }
    let mut out = filter(&scaled);
    for pixel in out.pixels_mut() {
        let (r, g, b, a) = unpremultiply(pixel[0], pixel[1], pixel[2], pixel[3]);
        pixel.0 = [r, g, b, a];
    }
    out
}

pub fn blur(image: &RgbaImage, sigma: f32) -> RgbaImage {
    premultiplied(image, |pixels| imageops::blur(pixels, sigma))
}

pub fn sharpen(image: &RgbaImage, sigma: f32, threshold: i32) -> RgbaImage {
    premultiplied(image, |pixels| imageops::unsharpen(pixels, sigma, threshold))
}

/// Produces visible blocks `factor` pixels wide without changing size.
pub fn pixelate(image: &RgbaImage, factor: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let small_w = (width / factor).max(1);
    let small_h = (height / factor).max(1);
    let small = imageops::resize(image, small_w, small_h, FilterType::Triangle);
    imageops::resize(&small, width, height, FilterType::Nearest)
}

/// Pencil sketch: color-dodge a blurred negative onto the grayscale image.
pub fn sketch(image: RgbaImage, sigma: f32) -> RgbaImage {
    let gray = color::grayscale(image);
    let negative = color::invert(gray.clone());
    let mut softened = blur(&negative, sigma);
    // The dodge layer must be opaque, the blurred alpha would fade it.
    for (pixel, base) in softened.pixels_mut().zip(gray.pixels()) {
        pixel[3] = if base[3] == 0 { 0 } else { 255 };
    }
    blend_onto(gray, &softened, BlendMode::ColorDodge)
}
