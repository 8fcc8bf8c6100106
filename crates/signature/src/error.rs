//! Error types for the signature crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Failed to decode data URL body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to (de)serialize stroke data: {0}")]
    StrokeData(#[from] serde_json::Error),

    #[error("Canvas has no pixels ({width}x{height})")]
    EmptyCanvas { width: u32, height: u32 },
}
