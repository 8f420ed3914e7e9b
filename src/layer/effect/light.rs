//! Effects that composite a generated light layer over the photo.

use image::imageops;
use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::layer::blend::{BlendMode, blend_onto};
use crate::layer::svg::{hex_color, render_svg, svg_document};
use crate::sticker::SizePx;

const PEARL_CENTER: [u8; 3] = [255, 255, 255];
const PEARL_EDGE: [u8; 3] = [230, 220, 255];
const PEARL_OPACITY: f32 = 0.5;

fn size_of(image: &RgbaImage) -> SizePx {
    SizePx::new(image.width(), image.height())
}

/// Diagonal gradient from the top-left corner, overlay-blended.
pub fn gradient(image: RgbaImage, from: [u8; 3], to: [u8; 3]) -> Result<RgbaImage> {
    let body = format!(
        r#"<defs><linearGradient id="g" x1="0" y1="0" x2="1" y2="1"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs><rect width="100%" height="100%" fill="url(#g)"/>"#,
        hex_color(from),
        hex_color(to),
    );
    let layer = render_svg(&svg_document(size_of(&image), &body), size_of(&image))?;
    Ok(blend_onto(image, &layer, BlendMode::Overlay))
}

/// Soft white-to-lavender radial sheen, screen-blended at half opacity.
pub fn pearl(image: RgbaImage) -> Result<RgbaImage> {
    let body = format!(
        r#"<defs><radialGradient id="p" cx="0.5" cy="0.5" r="0.7"><stop offset="0" stop-color="{center}" stop-opacity="{o}"/><stop offset="1" stop-color="{edge}" stop-opacity="{o}"/></radialGradient></defs><rect width="100%" height="100%" fill="url(#p)"/>"#,
        center = hex_color(PEARL_CENTER),
        edge = hex_color(PEARL_EDGE),
        o = PEARL_OPACITY,
    );
    let layer = render_svg(&svg_document(size_of(&image), &body), size_of(&image))?;
    Ok(blend_onto(image, &layer, BlendMode::Screen))
}

/// White silhouette of the visible pixels, blurred and screen-blended.
pub fn glow(image: RgbaImage, sigma: f32, strength: f32) -> RgbaImage {
    let silhouette = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let alpha = f32::from(image.get_pixel(x, y)[3]) * strength;
        Rgba([255, 255, 255, alpha.round() as u8])
    });
    let halo = imageops::blur(&silhouette, sigma);
    blend_onto(image, &halo, BlendMode::Screen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid_gray(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn gradient_tints_opposite_corners_differently() {
        let out = gradient(mid_gray(32), [255, 0, 0], [0, 0, 255]).unwrap();
        let top_left = out.get_pixel(0, 0);
        let bottom_right = out.get_pixel(31, 31);
        assert!(top_left[0] > top_left[2]);
        assert!(bottom_right[2] > bottom_right[0]);
        assert_eq!(top_left[3], 255);
    }

    #[test]
    fn pearl_lightens() {
        let out = pearl(mid_gray(16)).unwrap();
        let p = out.get_pixel(8, 8);
        assert!(p[0] > 128 && p[1] > 128 && p[2] > 128);
    }

    #[test]
    fn glow_lightens_subject_only_within_its_alpha() {
        let img = RgbaImage::from_fn(32, 32, |x, _| {
            if x < 16 { Rgba([0, 0, 0, 0]) } else { Rgba([60, 60, 60, 255]) }
        });
        let out = glow(img, 2.0, 0.6);
        assert_eq!(out.get_pixel(2, 2)[3], 0);
        let p = out.get_pixel(28, 16);
        assert!(p[0] > 60, "glow should brighten the subject, got {:?}", p);
        assert_eq!(p[3], 255);
    }
}
