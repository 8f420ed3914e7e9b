//! Shape frames applied as alpha masks.
//!
//! A frame builds an SVG mask the size of the canvas (shape filled white
//! on transparent) and keeps only the pixels inside it. Geometry is
//! derived from the canvas size each time; nothing is stored.

use std::f32::consts::PI;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::LayerEffect;
use super::svg::{composite_dest_in, render_svg, svg_document};
use crate::error::{Result, StickerError};
use crate::sticker::SizePx;

/// Corner radius of the rounded frame relative to the canvas width.
pub const ROUNDED_CORNER_RATIO: f32 = 0.12;

/// Inner to outer radius of the star's points.
pub const STAR_INNER_RATIO: f32 = 0.5;

const STAR_POINTS: u32 = 5;

/// Heart outline in a 100x100 box.
const HEART_PATH: &str = "M50 92 C22 72 2 54 2 31 C2 14 15 3 29 3 C39 3 46 9 50 17 C54 9 61 3 71 3 C85 3 98 14 98 31 C98 54 78 72 50 92 Z";

/// Cloud puffs in a 100x100 box.
const CLOUD_SHAPES: &str = r#"<circle cx="27" cy="60" r="21"/><circle cx="50" cy="43" r="27"/><circle cx="74" cy="58" r="21"/><rect x="27" y="55" width="47" height="26"/>"#;

/// The recognized frame shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum FrameSpec {
    Circle,
    Heart,
    Star,
    Rounded,
    Diamond,
    Hexagon,
    Cloud,
}

impl FrameSpec {
    pub const ALL: [FrameSpec; 7] = [
        Self::Circle,
        Self::Heart,
        Self::Star,
        Self::Rounded,
        Self::Diamond,
        Self::Hexagon,
        Self::Cloud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Heart => "heart",
            Self::Star => "star",
            Self::Rounded => "rounded",
            Self::Diamond => "diamond",
            Self::Hexagon => "hexagon",
            Self::Cloud => "cloud",
        }
    }

    /// Parses a frame name; `"none"` yields `Ok(None)`.
    pub fn from_name(name: &str) -> Result<Option<Self>> {
        let normalized = name.trim().to_ascii_lowercase();
        if normalized == "none" {
            return Ok(None);
        }
        Self::ALL
            .into_iter()
            .find(|frame| frame.as_str() == normalized)
            .map(Some)
            .ok_or_else(|| StickerError::UnknownFrame(name.to_string()))
    }

    /// SVG markup of the white-on-transparent mask for a canvas of `size`.
    pub fn mask_svg(&self, size: SizePx) -> String {
        let w = size.width as f32;
        let h = size.height as f32;

        let shape = match self {
            Self::Circle => format!(
                r#"<circle cx="{}" cy="{}" r="{}"/>"#,
                w / 2.0,
                h / 2.0,
                w.min(h) / 2.0
            ),
            Self::Star => polygon(&star_points(w, h)),
            Self::Rounded => {
                let radius = w * ROUNDED_CORNER_RATIO;
                format!(r#"<rect width="{w}" height="{h}" rx="{radius}" ry="{radius}"/>"#)
            }
            Self::Diamond => polygon(&[(w / 2.0, 0.0), (w, h / 2.0), (w / 2.0, h), (0.0, h / 2.0)]),
            Self::Hexagon => polygon(&[
                (w / 4.0, 0.0),
                (w * 3.0 / 4.0, 0.0),
                (w, h / 2.0),
                (w * 3.0 / 4.0, h),
                (w / 4.0, h),
                (0.0, h / 2.0),
            ]),
            Self::Heart => unit_box(w, h, &format!(r#"<path d="{HEART_PATH}"/>"#)),
            Self::Cloud => unit_box(w, h, CLOUD_SHAPES),
        };

        svg_document(size, &format!(r##"<g fill="#ffffff">{shape}</g>"##))
    }

    /// Renders the mask for a canvas of `size`.
    pub fn render_mask(&self, size: SizePx) -> Result<RgbaImage> {
        render_svg(&self.mask_svg(size), size)
    }
}

impl std::fmt::Display for FrameSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keeps only the pixels of `image` inside `frame`.
pub fn apply_frame(mut image: RgbaImage, frame: &FrameSpec) -> Result<RgbaImage> {
    let mask = frame.render_mask(SizePx::new(image.width(), image.height()))?;
    composite_dest_in(&mut image, &mask);
    Ok(image)
}

impl LayerEffect for FrameSpec {
    fn name(&self) -> &'static str {
        self.as_str()
    }

    fn transform(&self, image: RgbaImage) -> Result<RgbaImage> {
        apply_frame(image, self)
    }
}

fn polygon(points: &[(f32, f32)]) -> String {
    let points: Vec<String> = points.iter().map(|(x, y)| format!("{x},{y}")).collect();
    format!(r#"<polygon points="{}"/>"#, points.join(" "))
}

/// Scales markup drawn in a 100x100 box onto the canvas.
fn unit_box(w: f32, h: f32, shapes: &str) -> String {
    format!(
        r#"<g transform="scale({} {})">{shapes}</g>"#,
        w / 100.0,
        h / 100.0
    )
}

/// Alternating outer/inner vertices, first point straight up.
fn star_points(w: f32, h: f32) -> Vec<(f32, f32)> {
    let (cx, cy) = (w / 2.0, h / 2.0);
    let outer = w.min(h) / 2.0;
    let inner = outer * STAR_INNER_RATIO;
    (0..STAR_POINTS * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -PI / 2.0 + i as f32 * PI / STAR_POINTS as f32;
            (cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn opaque(size: u32) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba([200, 100, 50, 255]))
    }

    #[test]
    fn parse_names() {
        for frame in FrameSpec::ALL {
            assert_eq!(FrameSpec::from_name(frame.as_str()).unwrap(), Some(frame));
        }
        assert_eq!(FrameSpec::from_name("none").unwrap(), None);
        assert!(matches!(
            FrameSpec::from_name("octagon"),
            Err(StickerError::UnknownFrame(_))
        ));
    }

    #[test]
    fn circle_clears_everything_outside_radius() {
        let size = 64u32;
        let out = apply_frame(opaque(size), &FrameSpec::Circle).unwrap();
        let center = size as f32 / 2.0;
        let radius = center;

        for (x, y, pixel) in out.enumerate_pixels() {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance > radius + 1.0 {
                assert_eq!(pixel[3], 0, "pixel ({x}, {y}) should be masked out");
            }
            if distance < radius - 1.0 {
                assert_eq!(pixel.0, [200, 100, 50, 255], "pixel ({x}, {y}) should be kept");
            }
        }
    }

    #[test]
    fn every_frame_keeps_center_and_size() {
        for frame in FrameSpec::ALL {
            let out = apply_frame(opaque(50), &frame).unwrap();
            assert_eq!(out.dimensions(), (50, 50));
            assert_eq!(out.get_pixel(25, 30)[3], 255, "{frame} should keep the center");
        }
    }

    #[test]
    fn every_frame_clears_corners() {
        for frame in FrameSpec::ALL {
            let out = apply_frame(opaque(50), &frame).unwrap();
            assert_eq!(out.get_pixel(0, 0)[3], 0, "{frame} should clear the corner");
            assert_eq!(out.get_pixel(49, 49)[3], 0, "{frame} should clear the corner");
        }
    }

    #[test]
    fn rounded_keeps_edge_midpoints() {
        let out = apply_frame(opaque(100), &FrameSpec::Rounded).unwrap();
        assert_eq!(out.get_pixel(50, 0)[3], 255);
        assert_eq!(out.get_pixel(0, 50)[3], 255);
    }

    #[test]
    fn star_has_expected_vertex_count() {
        let points = star_points(100.0, 100.0);
        assert_eq!(points.len(), 10);
        let (x, y) = points[0];
        assert!((x - 50.0).abs() < 1e-4 && y.abs() < 1e-4);
        let (ix, iy) = points[1];
        let inner = ((ix - 50.0).powi(2) + (iy - 50.0).powi(2)).sqrt();
        assert!((inner - 25.0).abs() < 1e-3);
    }

    #[test]
    fn masked_pixels_are_fully_cleared() {
        let out = apply_frame(opaque(40), &FrameSpec::Diamond).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}
