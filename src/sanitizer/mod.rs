//! Image Sanitizer
//!
//! Strips EXIF, ICC profiles and comments from uploads by decoding them to
//! raw pixels and encoding a fresh file. Only pixel data survives.

pub mod codec;

pub use codec::ImageCodec;

use axum::body::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("no image codec for this format")]
    NoCodec,

    #[error("sanitizer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run `codec` over an upload on the blocking pool.
pub async fn sanitize(codec: ImageCodec, data: Bytes) -> Result<Vec<u8>, SanitizeError> {
    if !codec.strips_metadata() {
        warn!(size = data.len(), "Storing upload verbatim, metadata is not stripped");
        return Ok(data.to_vec());
    }

    let input_len = data.len();
    let output = tokio::task::spawn_blocking(move || codec.sanitize(&data)).await??;
    debug!(%codec, input_len, output_len = output.len(), "Re-encoded upload");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    #[tokio::test]
    async fn test_sanitize_on_blocking_pool() {
        let mut buf = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(6, 6))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();

        let out = sanitize(ImageCodec::Png, Bytes::from(buf.into_inner())).await.unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[tokio::test]
    async fn test_sanitize_reports_decode_failure() {
        let result = sanitize(ImageCodec::Gif, Bytes::from_static(b"GIF89a-truncated")).await;
        assert!(matches!(result, Err(SanitizeError::Decode(_))));
    }

    #[tokio::test]
    async fn test_sanitize_copy_verbatim() {
        let out = sanitize(ImageCodec::CopyVerbatim, Bytes::from_static(b"raw")).await.unwrap();
        assert_eq!(out, b"raw");
    }
}
