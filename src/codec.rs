//! Decoding of input photos and quality-controlled WebP encoding.
//!
//! The `image` crate only ships a lossless WebP encoder, so quality below
//! 100 is realised by quantizing the RGB channels before encoding. Fewer
//! distinct colors compress better while alpha stays exact.

use std::io::Cursor;

use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageReader, RgbaImage};

use crate::error::{Result, StickerError};
use crate::sticker::{EncodedSticker, SizePx};

/// Quality value meaning "no quantization".
pub const LOSSLESS_QUALITY: u8 = 100;

/// Decodes raw bytes, guessing the format from the content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StickerError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| StickerError::Decode(e.to_string()))
}

/// Reads the pixel dimensions from an encoded header without decoding pixels.
pub fn probe_size(bytes: &[u8]) -> Result<SizePx> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StickerError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| StickerError::Decode(e.to_string()))?;
    Ok(SizePx::new(width, height))
}

/// Encodes an RGBA image as WebP at the given quality (1-100).
pub fn encode_webp(image: &RgbaImage, quality: u8) -> Result<EncodedSticker> {
    let quality = quality.clamp(1, LOSSLESS_QUALITY);
    let (width, height) = image.dimensions();

    let quantized;
    let pixels = if quality < LOSSLESS_QUALITY {
        let mut copy = image.clone();
        quantize_rgb(copy.as_mut(), quality);
        quantized = copy;
        &quantized
    } else {
        image
    };

    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(Cursor::new(&mut buffer))
        .encode(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| StickerError::Encoding(e.to_string()))?;

    Ok(EncodedSticker::new(
        buffer,
        SizePx::new(width, height),
        Some(quality),
    ))
}

/// Reduces each RGB channel to the number of levels `quality` allows.
fn quantize_rgb(data: &mut [u8], quality: u8) {
    let levels = levels_for_quality(quality);
    if levels >= 256 {
        return;
    }
    let step = 255.0 / (levels as f32 - 1.0);
    for pixel in data.chunks_exact_mut(4) {
        for channel in pixel.iter_mut().take(3) {
            let bucket = (f32::from(*channel) / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Quadratic curve so high qualities stay close to the original while low
/// qualities get very coarse palettes.
fn levels_for_quality(quality: u8) -> u16 {
    if quality >= LOSSLESS_QUALITY {
        return 256;
    }
    let normalized = f32::from(quality.max(1)) / 100.0;
    (2.0 + normalized * normalized * 254.0).round().clamp(2.0, 256.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) % 256) as u8,
                if x < 4 { 0 } else { 255 },
            ])
        })
    }

    #[test]
    fn lossless_roundtrip_is_exact() {
        let img = gradient(32, 16);
        let encoded = encode_webp(&img, LOSSLESS_QUALITY).unwrap();
        assert_eq!(encoded.size, SizePx::new(32, 16));
        assert_eq!(encoded.quality, Some(100));

        let decoded = decode(&encoded.bytes).unwrap().to_rgba8();
        // Fully transparent pixels may have their color discarded.
        for (a, b) in img.pixels().zip(decoded.pixels()) {
            assert_eq!(a[3], b[3]);
            if a[3] > 0 {
                assert_eq!(a.0, b.0);
            }
        }
    }

    #[test]
    fn lower_quality_shrinks_output() {
        let img = gradient(128, 128);
        let high = encode_webp(&img, 100).unwrap();
        let low = encode_webp(&img, 20).unwrap();
        assert!(low.len() < high.len(), "{} >= {}", low.len(), high.len());
    }

    #[test]
    fn quantize_keeps_alpha() {
        let mut data = vec![13, 77, 200, 42];
        quantize_rgb(&mut data, 10);
        assert_eq!(data[3], 42);
    }

    #[test]
    fn levels_grow_with_quality() {
        assert_eq!(levels_for_quality(100), 256);
        assert!(levels_for_quality(90) > levels_for_quality(30));
        assert_eq!(levels_for_quality(1), 2);
    }

    #[test]
    fn probe_reads_header() {
        let encoded = encode_webp(&gradient(20, 10), 100).unwrap();
        assert_eq!(probe_size(&encoded.bytes).unwrap(), SizePx::new(20, 10));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode(b"not an image"),
            Err(StickerError::Decode(_))
        ));
    }
}
