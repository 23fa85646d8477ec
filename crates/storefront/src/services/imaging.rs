//! Image downscaling and re-encoding for catalog and cart images.
//!
//! Images are stored inline as `data:` URLs, so they are shrunk before
//! upload: the larger side is capped at `max_dimension` and the result is
//! re-encoded. JPEG honours the quality setting, PNG stays lossless, and any
//! other decodable format becomes JPEG.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

/// Default cap for the larger image side, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 1500;

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 80;

/// Errors from [`compress`].
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid compression options: {0}")]
    InvalidOptions(String),
}

/// Size and quality constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    pub max_dimension: u32,
    /// JPEG quality, 1 to 100. Ignored for PNG output.
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CompressOptions {
    fn validate(self) -> Result<Self, ImageError> {
        if self.max_dimension == 0 {
            return Err(ImageError::InvalidOptions(
                "max dimension must be at least 1".to_owned(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ImageError::InvalidOptions(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(self)
    }
}

/// A re-encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub mime: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl CompressedImage {
    /// Render as a `data:<mime>;base64,...` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Scale `(width, height)` so the larger side is at most `max`.
///
/// Aspect ratio is kept; the smaller side is rounded and never below 1.
#[must_use]
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = |side: u32, larger: u32| -> u32 {
        let scaled = (u64::from(side) * u64::from(max) + u64::from(larger) / 2) / u64::from(larger);
        u32::try_from(scaled).unwrap_or(max).max(1)
    };

    if width >= height {
        (max, scale(height, width))
    } else {
        (scale(width, height), max)
    }
}

/// Decode, downscale, and re-encode an image.
///
/// # Errors
///
/// Returns `ImageError::InvalidOptions` for out-of-range options,
/// `ImageError::Decode` if the bytes are not a supported image, and
/// `ImageError::Encode` if re-encoding fails.
pub fn compress(bytes: &[u8], options: CompressOptions) -> Result<CompressedImage, ImageError> {
    let options = options.validate()?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(image::ImageError::IoError(e)))?;
    let format = reader.format();
    let decoded = reader.decode().map_err(ImageError::Decode)?;

    let (width, height) = fit_within(decoded.width(), decoded.height(), options.max_dimension);
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    let mut out = Vec::new();
    let mime = if format == Some(ImageFormat::Png) {
        resized
            .write_with_encoder(PngEncoder::new(&mut out))
            .map_err(ImageError::Encode)?;
        "image/png"
    } else {
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(resized.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, options.quality))
            .map_err(ImageError::Encode)?;
        "image/jpeg"
    };

    debug!(
        input_bytes = bytes.len(),
        output_bytes = out.len(),
        width,
        height,
        mime,
        "Image compressed"
    );

    Ok(CompressedImage {
        mime,
        width,
        height,
        bytes: out,
    })
}
