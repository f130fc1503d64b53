use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ColorType, DynamicImage, Frame, ImageFormat};

use super::SanitizeError;

/// JPEG re-encode quality (1-100).
pub const JPEG_QUALITY: u8 = 90;

/// Per-format decode/encode strategy used to strip non-pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCodec {
    Jpeg,
    Png,
    Gif,
    Webp,
    /// Store the upload byte-for-byte. Metadata is kept.
    CopyVerbatim,
}

impl ImageCodec {
    /// Pick the codec for a lower-cased extension.
    pub fn for_extension(ext: &str, webp_reencode: bool) -> Self {
        match ext {
            "jpg" | "jpeg" => ImageCodec::Jpeg,
            "png" => ImageCodec::Png,
            "gif" => ImageCodec::Gif,
            "webp" if webp_reencode => ImageCodec::Webp,
            _ => ImageCodec::CopyVerbatim,
        }
    }

    pub fn format(&self) -> Option<ImageFormat> {
        match self {
            ImageCodec::Jpeg => Some(ImageFormat::Jpeg),
            ImageCodec::Png => Some(ImageFormat::Png),
            ImageCodec::Gif => Some(ImageFormat::Gif),
            ImageCodec::Webp => Some(ImageFormat::WebP),
            ImageCodec::CopyVerbatim => None,
        }
    }

    pub fn strips_metadata(&self) -> bool {
        self.format().is_some()
    }

    /// Decode `bytes` strictly as this codec's format.
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, SanitizeError> {
        let format = self.format().ok_or(SanitizeError::NoCodec)?;
        image::load_from_memory_with_format(bytes, format).map_err(SanitizeError::Decode)
    }

    pub fn encode(&self, img: &DynamicImage) -> Result<Vec<u8>, SanitizeError> {
        let mut buf = Vec::new();
        match self {
            ImageCodec::Jpeg => {
                // the JPEG encoder has no alpha channel
                let img = match img.color() {
                    ColorType::L8 | ColorType::Rgb8 => img.clone(),
                    _ => DynamicImage::ImageRgb8(img.to_rgb8()),
                };
                let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
                img.write_with_encoder(encoder).map_err(SanitizeError::Encode)?;
            }
            ImageCodec::Png => {
                let encoder =
                    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
                img.write_with_encoder(encoder).map_err(SanitizeError::Encode)?;
            }
            ImageCodec::Gif => {
                let mut encoder = GifEncoder::new(&mut buf);
                encoder
                    .encode_frame(Frame::new(img.to_rgba8()))
                    .map_err(SanitizeError::Encode)?;
            }
            ImageCodec::Webp => {
                let img = if img.color().has_alpha() {
                    DynamicImage::ImageRgba8(img.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                };
                let encoder = WebPEncoder::new_lossless(&mut buf);
                img.write_with_encoder(encoder).map_err(SanitizeError::Encode)?;
            }
            ImageCodec::CopyVerbatim => return Err(SanitizeError::NoCodec),
        }
        Ok(buf)
    }

    /// Bytes to persist for an upload: a fresh encoding of the decoded
    /// pixels, or the input unchanged for [`ImageCodec::CopyVerbatim`].
    pub fn sanitize(&self, bytes: &[u8]) -> Result<Vec<u8>, SanitizeError> {
        match self {
            ImageCodec::CopyVerbatim => Ok(bytes.to_vec()),
            _ => {
                let img = self.decode(bytes)?;
                self.encode(&img)
            }
        }
    }
}

impl std::fmt::Display for ImageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageCodec::Jpeg => write!(f, "jpeg"),
            ImageCodec::Png => write!(f, "png"),
            ImageCodec::Gif => write!(f, "gif"),
            ImageCodec::Webp => write!(f, "webp"),
            ImageCodec::CopyVerbatim => write!(f, "copy"),
        }
    }
}
