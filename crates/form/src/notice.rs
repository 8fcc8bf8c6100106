//! Toast notices returned by form handlers

use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// User-facing notice texts
pub mod messages {
    pub const FORM_RESET: &str = "Formulario reiniciado";
    pub const INVALID_IMAGE: &str = "Por favor selecciona una imagen válida";
    pub const IMAGE_LOAD_FAILED: &str = "Error al cargar la imagen";
    pub const IMAGE_UPDATED: &str = "Imagen actualizada exitosamente";
    pub const CAMERA_FAILED: &str = "Error al acceder a la cámara";
    pub const CAPTURE_FAILED: &str = "Error al capturar la foto";
    pub const PHOTO_PROCESS_FAILED: &str = "Error al procesar la foto";
    pub const PHOTO_CAPTURED: &str = "Foto capturada exitosamente";
    pub const SIGNATURE_CLEARED: &str = "Firma borrada";
    pub const PEN_COLOR_CHANGED: &str = "Color de firma cambiado";
    pub const REQUIRED_FIELDS: &str = "Por favor complete los campos requeridos";
    pub const OPENING_WHATSAPP: &str = "Abriendo WhatsApp...";
    pub const SHARED: &str = "Compartido exitosamente";
    pub const SHARE_FAILED: &str = "Error al compartir";
    pub const REPORT_READY: &str = "Informe listo para guardar como PDF";
    pub const REPORT_FAILED: &str = "Error al generar el PDF";
    pub const SAVE_FAILED: &str = "Error al guardar";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }
}

/// A toast message for the host to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    /// Class list for the toast element, e.g. `toast error`
    pub fn css_class(&self) -> String {
        format!("toast {}", self.kind.as_str())
    }
}

impl From<&FormError> for Notice {
    fn from(error: &FormError) -> Self {
        Notice::error(error.user_message())
    }
}
