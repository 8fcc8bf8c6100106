//! Error types for the checklist form.

use signature::SignatureError;
use thiserror::Error;

use crate::notice::messages;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("Not an image file: {0}")]
    InvalidImageType(String),

    #[error("No camera session is active")]
    NoActiveCamera,

    #[error("Camera frame is empty")]
    EmptyFrame,

    #[error("Camera unavailable: {0}")]
    Camera(String),

    #[error("Share failed: {0}")]
    Share(String),

    #[error("Report rendering failed: {0}")]
    Report(String),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to serialize: {0}")]
    Json(#[from] serde_json::Error),
}

impl FormError {
    /// Text shown to the user for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            FormError::MissingRequired(_) => messages::REQUIRED_FIELDS,
            FormError::InvalidImageType(_) => messages::INVALID_IMAGE,
            FormError::NoActiveCamera | FormError::EmptyFrame => messages::CAPTURE_FAILED,
            FormError::Camera(_) => messages::CAMERA_FAILED,
            FormError::Share(_) => messages::SHARE_FAILED,
            FormError::Report(_) => messages::REPORT_FAILED,
            FormError::Signature(_) | FormError::Image(_) => messages::PHOTO_PROCESS_FAILED,
            FormError::Store(_) | FormError::Json(_) => messages::SAVE_FAILED,
        }
    }
}

/// Errors from the key-value storage backing the theme
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage is unavailable")]
    Unavailable,

    #[error("Failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}
