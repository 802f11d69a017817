//! # Heed Media
//!
//! Image transcoder implementing the `MediaTranscoder` port with the `image`
//! crate. Every submitted photo becomes two JPEG renditions:
//!
//! - **high**: original dimensions, high quality
//! - **low**: downscaled to a bounded width (aspect ratio kept, never
//!   upscaled), low quality
//!
//! Decoding sniffs the input format (JPEG, PNG, WebP, GIF, ...). Alpha is
//! dropped since the output is JPEG.

use bytes::Bytes;
use heed_domain::ports::{MediaTranscoder, TranscodedImage};
use heed_domain::PostError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use std::io::Cursor;
use tracing::debug;

/// Parameters of the two renditions
#[derive(Clone, Debug)]
pub struct TranscodeConfig {
    /// Maximum width of the low rendition in pixels
    pub low_width: u32,
    /// JPEG quality of the high rendition (1-100)
    pub high_quality: u8,
    /// JPEG quality of the low rendition (1-100)
    pub low_quality: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            low_width: 400,
            high_quality: 90,
            low_quality: 40,
        }
    }
}

/// JPEG transcoder
///
/// **Note:** `transcode` is CPU-intensive and blocking. The ingestion service
/// calls it from `spawn_blocking`.
#[derive(Clone, Debug, Default)]
pub struct ImageTranscoder {
    config: TranscodeConfig,
}

impl ImageTranscoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TranscodeConfig {
        &self.config
    }

    /// Dimensions of the low rendition for a source of `width` x `height`
    fn low_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.config.low_width {
            return (width, height);
        }
        let scaled = (u64::from(height) * u64::from(self.config.low_width)) / u64::from(width);
        (self.config.low_width, (scaled as u32).max(1))
    }
}

impl MediaTranscoder for ImageTranscoder {
    fn transcode(&self, data: &[u8]) -> Result<TranscodedImage, PostError> {
        let img = image::load_from_memory(data)
            .map_err(|e| PostError::transcode(format!("Failed to decode image: {e}")))?;

        let (width, height) = img.dimensions();
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

        let high = encode_jpeg(&rgb, self.config.high_quality)?;

        let (low_w, low_h) = self.low_dimensions(width, height);
        let low = if (low_w, low_h) == (width, height) {
            encode_jpeg(&rgb, self.config.low_quality)?
        } else {
            let resized = rgb.resize_exact(low_w, low_h, FilterType::Triangle);
            encode_jpeg(&resized, self.config.low_quality)?
        };

        debug!(
            width,
            height,
            low_width = low_w,
            low_height = low_h,
            high_bytes = high.len(),
            low_bytes = low.len(),
            "Image transcoded"
        );

        Ok(TranscodedImage { high, low })
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, PostError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| PostError::transcode(format!("Failed to encode JPEG: {e}")))?;
    Ok(Bytes::from(buffer.into_inner()))
}
