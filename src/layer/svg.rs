//! SVG rendering utilities using resvg/usvg.
//!
//! Frames, gradient overlays and the text layer all describe their
//! geometry as SVG markup sized to the canvas. This module turns that
//! markup into RGBA pixels and provides the compositing rules they need.

use std::sync::{Arc, LazyLock};

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree, fontdb};

use crate::error::{Result, StickerError};
use crate::sticker::SizePx;

/// System fonts, loaded once and shared read-only by every render.
static FONT_DB: LazyLock<Arc<fontdb::Database>> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::debug!("loaded {} font faces for text overlays", db.len());
    Arc::new(db)
});

// ============================================================================
// Markup
// ============================================================================

/// Escapes text for use inside SVG element content or attribute values.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats an RGB triple as `#rrggbb`.
pub fn hex_color([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Wraps `body` in an `<svg>` root of the given pixel size.
pub fn svg_document(size: SizePx, body: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
        w = size.width,
        h = size.height,
    )
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Parses SVG markup with the shared font database.
pub fn parse_svg(svg_data: &str) -> Result<Tree> {
    let mut opts = Options::default();
    opts.fontdb = Arc::clone(&FONT_DB);
    Tree::from_str(svg_data, &opts).map_err(|e| StickerError::Render(e.to_string()))
}

/// Renders SVG markup to an RGBA image of exactly `size`.
///
/// The document is stretched independently on each axis so its own
/// width/height map onto the requested canvas.
pub fn render_svg(svg_data: &str, size: SizePx) -> Result<RgbaImage> {
    let tree = parse_svg(svg_data)?;

    let svg_size = tree.size();
    let scale_x = size.width as f32 / svg_size.width();
    let scale_y = size.height as f32 / svg_size.height();

    let mut pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
        StickerError::Render(format!(
            "cannot allocate {}x{} pixmap",
            size.width, size.height
        ))
    })?;
    resvg::render(
        &tree,
        Transform::from_scale(scale_x, scale_y),
        &mut pixmap.as_mut(),
    );

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny_skia uses premultiplied alpha, we need to unpremultiply
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }

    img
}

/// Scales color by alpha.
pub(crate) fn premultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
    (scale(r), scale(g), scale(b), a)
}

/// Unpremultiplies a premultiplied alpha pixel.
pub(crate) fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}

// ============================================================================
// Compositing
// ============================================================================

/// Composites a same-size layer over `dest` (source over destination).
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage) {
    for (dst_pixel, src_pixel) in dest.pixels_mut().zip(src.pixels()) {
        *dst_pixel = alpha_blend(*src_pixel, *dst_pixel);
    }
}

/// Keeps destination color where the mask is opaque ("destination-in").
///
/// Output alpha is the destination alpha scaled by the mask alpha, so
/// everything outside the mask becomes fully transparent.
pub fn composite_dest_in(dest: &mut RgbaImage, mask: &RgbaImage) {
    for (pixel, mask_pixel) in dest.pixels_mut().zip(mask.pixels()) {
        let alpha = u16::from(pixel[3]) * u16::from(mask_pixel[3]);
        pixel[3] = ((alpha + 127) / 255) as u8;
        if pixel[3] == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

/// Alpha blends two RGBA pixels (source over destination).
fn alpha_blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;

    // Source over compositing
    let out_a = sa + da * (1.0 - sa);

    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f32 / 255.0;
        let df = d as f32 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round() as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

// ============================================================================
// Tests
// ============================================================================
