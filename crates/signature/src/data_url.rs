//! `data:` URL encoding for exported images

use std::fmt;
use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::constants::EMPTY_DATA_URL;
use crate::error::SignatureError;

/// A decoded `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// MIME type, empty for `data:,`
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// The placeholder produced for canvases without pixels
    pub fn empty() -> Self {
        Self::new("", Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parse `data:[<mime>][;base64],<body>`
    ///
    /// Non-base64 bodies are taken verbatim.
    pub fn parse(url: &str) -> Result<Self, SignatureError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| SignatureError::InvalidDataUrl("missing data: scheme".to_string()))?;
        let (meta, body) = rest
            .split_once(',')
            .ok_or_else(|| SignatureError::InvalidDataUrl("missing ',' separator".to_string()))?;

        let (mime, is_base64) = match meta.strip_suffix(";base64") {
            Some(mime) => (mime, true),
            None => (meta, false),
        };

        let bytes = if is_base64 {
            STANDARD.decode(body)?
        } else {
            body.as_bytes().to_vec()
        };

        Ok(Self::new(mime, bytes))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(EMPTY_DATA_URL);
        }
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Encode RGBA pixels as PNG
pub fn encode_png(image: &RgbaImage) -> Result<DataUrl, SignatureError> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(DataUrl::empty());
    }
    let mut png_bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    Ok(DataUrl::new("image/png", png_bytes))
}

/// Encode RGBA pixels as JPEG (alpha dropped) at the given quality
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<DataUrl, SignatureError> {
    if image.width() == 0 || image.height() == 0 {
        return Ok(DataUrl::empty());
    }
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut jpeg_bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_bytes, quality.clamp(1, 100));
        encoder.encode_image(&rgb)?;
    }
    Ok(DataUrl::new("image/jpeg", jpeg_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base64() {
        let url = DataUrl::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(url.mime, "image/png");
        assert_eq!(url.bytes, b"hello");
        assert_eq!(url.to_string(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_parse_empty_placeholder() {
        let url = DataUrl::parse(EMPTY_DATA_URL).unwrap();
        assert!(url.is_empty());
        assert_eq!(url.to_string(), EMPTY_DATA_URL);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DataUrl::parse("https://example.com").is_err());
        assert!(DataUrl::parse("data:image/png;base64").is_err());
        assert!(DataUrl::parse("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_png_round_trip() {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(1, 1, image::Rgba([0, 0, 255, 255]));

        let url = encode_png(&img).unwrap();
        assert_eq!(url.mime, "image/png");

        let decoded = image::load_from_memory(&url.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_jpeg_encoding() {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([200, 10, 10, 255]));
        let url = encode_jpeg(&img, 90).unwrap();
        assert_eq!(url.mime, "image/jpeg");
        // JPEG SOI marker
        assert_eq!(&url.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_zero_sized_images_encode_empty() {
        assert!(encode_png(&RgbaImage::new(0, 0)).unwrap().is_empty());
        assert!(encode_jpeg(&RgbaImage::new(0, 5), 90).unwrap().is_empty());
    }
}
