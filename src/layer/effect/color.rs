//! Per-pixel color effects.

use image::{DynamicImage, RgbaImage};
use palette::{Hsl, IntoColor, Srgb};

/// Classic sepia tone.
pub const SEPIA_MATRIX: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Saturation matrix with s = 2 over luminance weights (.3086, .6094, .0820).
pub const NEON_MATRIX: [[f32; 3]; 3] = [
    [1.6914, -0.6094, -0.0820],
    [-0.3086, 1.3906, -0.0820],
    [-0.3086, -0.6094, 1.9180],
];

/// Vintage keeps this fraction of the original saturation.
const VINTAGE_SATURATION: f32 = 0.5;

pub fn grayscale(image: RgbaImage) -> RgbaImage {
    DynamicImage::ImageRgba8(image).grayscale().into_rgba8()
}

pub fn invert(mut image: RgbaImage) -> RgbaImage {
    image::imageops::invert(&mut image);
    image
}

/// Applies a 3x3 linear combination to the RGB channels, clamping to 0-255.
pub fn apply_matrix(mut image: RgbaImage, matrix: &[[f32; 3]; 3]) -> RgbaImage {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let rgb = [f32::from(r), f32::from(g), f32::from(b)];
        let row = |m: &[f32; 3]| -> u8 {
            (m[0] * rgb[0] + m[1] * rgb[1] + m[2] * rgb[2])
                .round()
                .clamp(0.0, 255.0) as u8
        };
        pixel.0 = [row(&matrix[0]), row(&matrix[1]), row(&matrix[2]), a];
    }
    image
}

pub fn vintage(mut image: RgbaImage, tint: [u8; 3]) -> RgbaImage {
    let tint = tint.map(|c| f32::from(c) / 255.0);

    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue; // Skip fully transparent pixels
        }

        let rgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        let mut hsl: Hsl = rgb.into_color();
        hsl.saturation *= VINTAGE_SATURATION;
        let faded: Srgb = hsl.into_color();

        pixel.0 = [
            (faded.red * tint[0] * 255.0).round().clamp(0.0, 255.0) as u8,
            (faded.green * tint[1] * 255.0).round().clamp(0.0, 255.0) as u8,
            (faded.blue * tint[2] * 255.0).round().clamp(0.0, 255.0) as u8,
            a,
        ];
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn single(pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba(pixel))
    }

    #[test]
    fn sepia_matches_reference_values() {
        let out = apply_matrix(single([100, 150, 201, 255]), &SEPIA_MATRIX);
        // .393*100 + .769*150 + .189*201 = 192.639
        // .349*100 + .686*150 + .168*201 = 171.568
        // .272*100 + .534*150 + .131*201 = 133.631
        assert_eq!(out.get_pixel(0, 0).0, [193, 172, 134, 255]);
    }

    #[test]
    fn sepia_clamps_white() {
        let out = apply_matrix(single([255, 255, 255, 9]), &SEPIA_MATRIX);
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 239, 9]);
    }

    #[test]
    fn neon_keeps_gray_and_boosts_color() {
        let gray = apply_matrix(single([128, 128, 128, 255]), &NEON_MATRIX);
        let [r, g, b, _] = gray.get_pixel(0, 0).0;
        assert!(r.abs_diff(128) <= 1 && g.abs_diff(128) <= 1 && b.abs_diff(128) <= 1);

        let red = apply_matrix(single([200, 100, 100, 255]), &NEON_MATRIX);
        let p = red.get_pixel(0, 0);
        assert!(p[0] > 200 && p[1] < 100);
    }

    #[test]
    fn invert_keeps_alpha() {
        let out = invert(single([10, 20, 30, 77]));
        assert_eq!(out.get_pixel(0, 0).0, [245, 235, 225, 77]);
    }

    #[test]
    fn grayscale_equalizes_channels() {
        let out = grayscale(single([200, 40, 90, 123]));
        let p = out.get_pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
        assert_eq!(p[3], 123);
    }

    #[test]
    fn vintage_warms_white() {
        let out = vintage(single([255, 255, 255, 255]), [240, 220, 180]);
        assert_eq!(out.get_pixel(0, 0).0, [240, 220, 180, 255]);
    }

    #[test]
    fn vintage_skips_transparent() {
        let out = vintage(single([1, 2, 3, 0]), [240, 220, 180]);
        assert_eq!(out.get_pixel(0, 0).0, [1, 2, 3, 0]);
    }
}
