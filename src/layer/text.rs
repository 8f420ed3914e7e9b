//! Caption overlay rendered as SVG text.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::LayerEffect;
use super::svg::{composite_over, escape_markup, render_svg, svg_document};
use crate::error::{Result, StickerError};
use crate::sticker::SizePx;

/// Font size relative to the shorter canvas side.
pub const FONT_SIZE_RATIO: f32 = 0.08;

/// Outline width relative to the font size.
pub const STROKE_RATIO: f32 = 0.1;

const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, Helvetica, sans-serif";

/// Vertical placement of the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

impl TextPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => Err(StickerError::UnknownTextPosition(name.to_string())),
        }
    }

    /// Y coordinate of the caption's central baseline.
    fn anchor_y(&self, height: f32, font_size: f32) -> f32 {
        match self {
            Self::Top => font_size,
            Self::Center => height / 2.0,
            Self::Bottom => height - font_size,
        }
    }
}

/// A validated, non-empty caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpec {
    content: String,
    position: TextPosition,
}

impl TextSpec {
    /// Validates a caption.
    ///
    /// Surrounding whitespace is trimmed; nothing left means no caption
    /// (`Ok(None)`). More than `max_len` characters is an error.
    pub fn new(content: &str, position: TextPosition, max_len: usize) -> Result<Option<Self>> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let len = trimmed.chars().count();
        if len > max_len {
            return Err(StickerError::TextTooLong { len, max: max_len });
        }
        Ok(Some(Self {
            content: trimmed.to_string(),
            position,
        }))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> TextPosition {
        self.position
    }

    pub fn font_size(size: SizePx) -> f32 {
        (size.min_side() as f32 * FONT_SIZE_RATIO).round().max(1.0)
    }

    /// SVG markup of the caption layer for a canvas of `size`.
    pub fn overlay_svg(&self, size: SizePx) -> String {
        let font_size = Self::font_size(size);
        let stroke = font_size * STROKE_RATIO;
        let shadow_offset = (font_size * 0.06).max(1.0);
        let x = size.width as f32 / 2.0;
        let y = self.position.anchor_y(size.height as f32, font_size);

        let body = format!(
            concat!(
                r#"<defs><filter id="shadow" x="-20%" y="-20%" width="140%" height="140%">"#,
                r##"<feDropShadow dx="{offset}" dy="{offset}" stdDeviation="{blur}" flood-color="#000000" flood-opacity="0.6"/>"##,
                r#"</filter></defs>"#,
                r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{font_size}" font-weight="bold" "#,
                r##"text-anchor="middle" dominant-baseline="central" fill="#ffffff" stroke="#000000" "##,
                r#"stroke-width="{stroke}" stroke-linejoin="round" paint-order="stroke" filter="url(#shadow)">{text}</text>"#,
            ),
            offset = shadow_offset,
            blur = shadow_offset,
            x = x,
            y = y,
            family = FONT_FAMILY,
            font_size = font_size,
            stroke = stroke,
            text = escape_markup(&self.content),
        );
        svg_document(size, &body)
    }
}

/// Draws `spec` over `image`.
pub fn apply_text(mut image: RgbaImage, spec: &TextSpec) -> Result<RgbaImage> {
    let size = SizePx::new(image.width(), image.height());
    let layer = render_svg(&spec.overlay_svg(size), size)?;
    composite_over(&mut image, &layer);
    Ok(image)
}

impl LayerEffect for TextSpec {
    fn name(&self) -> &'static str {
        "text"
    }

    fn transform(&self, image: RgbaImage) -> Result<RgbaImage> {
        apply_text(image, self)
    }
}
