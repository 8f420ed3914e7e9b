//! Async wrappers that run the CPU-bound work on tokio's blocking pool.

use crate::budget;
use crate::config::StickerConfig;
use crate::error::{Result, StickerError};
use crate::pipeline;
use crate::sticker::EncodedSticker;

/// Owned-argument form of [`pipeline::compose`].
#[allow(clippy::too_many_arguments)]
pub async fn compose_async(
    source_bytes: Vec<u8>,
    effect_name: String,
    frame_name: String,
    text: String,
    text_position: String,
    target_size: u32,
    config: StickerConfig,
) -> Result<EncodedSticker> {
    tokio::task::spawn_blocking(move || {
        pipeline::compose(
            &source_bytes,
            &effect_name,
            &frame_name,
            &text,
            &text_position,
            target_size,
            &config,
        )
    })
    .await
    .map_err(|e| StickerError::Task(e.to_string()))?
}

/// Owned-argument form of [`budget::fit_to_budget`].
pub async fn fit_to_budget_async(
    encoded: Vec<u8>,
    source_bytes: Vec<u8>,
    max_bytes: usize,
    config: StickerConfig,
) -> Result<EncodedSticker> {
    tokio::task::spawn_blocking(move || {
        budget::fit_to_budget(encoded, &source_bytes, max_bytes, &config)
    })
    .await
    .map_err(|e| StickerError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{self, LOSSLESS_QUALITY};
    use crate::sticker::SizePx;
    use image::{Rgba, RgbaImage};

    fn webp_photo() -> Vec<u8> {
        let img = RgbaImage::from_fn(40, 30, |x, y| Rgba([x as u8 * 6, y as u8 * 8, 128, 255]));
        codec::encode_webp(&img, LOSSLESS_QUALITY).unwrap().into_bytes()
    }

    #[tokio::test]
    async fn compose_runs_off_the_runtime() {
        let sticker = compose_async(
            webp_photo(),
            "sepia".into(),
            "rounded".into(),
            "hey".into(),
            "top".into(),
            96,
            StickerConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(sticker.size, SizePx::square(96));
    }

    #[tokio::test]
    async fn compose_errors_pass_through() {
        let err = compose_async(
            webp_photo(),
            "glitter".into(),
            "none".into(),
            String::new(),
            "bottom".into(),
            96,
            StickerConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StickerError::UnknownEffect(_)));
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let jobs = ["grayscale", "invert", "neon", "pixelate"].map(|effect| {
            tokio::spawn(compose_async(
                webp_photo(),
                effect.to_string(),
                "circle".into(),
                String::new(),
                "bottom".into(),
                64,
                StickerConfig::default(),
            ))
        });
        for job in jobs {
            let sticker = job.await.unwrap().unwrap();
            assert_eq!(sticker.size, SizePx::square(64));
        }
    }

    #[tokio::test]
    async fn fit_to_budget_accepts_small_buffers() {
        let encoded = webp_photo();
        let out = fit_to_budget_async(
            encoded.clone(),
            encoded.clone(),
            1 << 20,
            StickerConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(out.bytes, encoded);
        assert_eq!(out.quality, None);
    }
}
