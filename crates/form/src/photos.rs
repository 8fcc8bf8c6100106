//! Before/after photo slots

use serde::{Deserialize, Serialize};
use signature::DataUrl;
use tracing::debug;

use crate::error::FormError;

/// Which of the two evidence photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    Before,
    After,
}

impl PhotoSlot {
    pub const ALL: [PhotoSlot; 2] = [PhotoSlot::Before, PhotoSlot::After];

    /// Lowercase key (`before` / `after`)
    pub fn key(self) -> &'static str {
        match self {
            PhotoSlot::Before => "before",
            PhotoSlot::After => "after",
        }
    }

    /// Suffix used by element ids, e.g. `previewBefore`
    pub fn element_suffix(self) -> &'static str {
        match self {
            PhotoSlot::Before => "Before",
            PhotoSlot::After => "After",
        }
    }

    /// Base name of the shared attachment
    pub fn attachment_name(self) -> &'static str {
        match self {
            PhotoSlot::Before => "antes",
            PhotoSlot::After => "despues",
        }
    }

    /// Human label used in the share message and report
    pub fn label(self) -> &'static str {
        match self {
            PhotoSlot::Before => "Antes",
            PhotoSlot::After => "Después",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "before" => Some(PhotoSlot::Before),
            "after" => Some(PhotoSlot::After),
            _ => None,
        }
    }
}

/// Stored photos as data URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoStore {
    before: Option<String>,
    after: Option<String>,
}

impl PhotoStore {
    pub fn get(&self, slot: PhotoSlot) -> Option<&str> {
        match slot {
            PhotoSlot::Before => self.before.as_deref(),
            PhotoSlot::After => self.after.as_deref(),
        }
    }

    /// Replace the slot's photo
    pub fn set(&mut self, slot: PhotoSlot, data_url: String) {
        debug!("Photo stored in slot {}", slot.key());
        *self.slot_mut(slot) = Some(data_url);
    }

    pub fn take(&mut self, slot: PhotoSlot) -> Option<String> {
        self.slot_mut(slot).take()
    }

    pub fn has(&self, slot: PhotoSlot) -> bool {
        self.get(slot).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }

    pub fn clear(&mut self) {
        self.before = None;
        self.after = None;
    }

    /// Clicking a preview opens the file picker only while it is empty
    pub fn opens_picker_on_click(&self, slot: PhotoSlot) -> bool {
        !self.has(slot)
    }

    fn slot_mut(&mut self, slot: PhotoSlot) -> &mut Option<String> {
        match slot {
            PhotoSlot::Before => &mut self.before,
            PhotoSlot::After => &mut self.after,
        }
    }
}

/// Accept only `image/*` MIME types
pub fn validate_image_mime(mime: &str) -> Result<(), FormError> {
    if mime.starts_with("image/") {
        Ok(())
    } else {
        Err(FormError::InvalidImageType(mime.to_string()))
    }
}

/// Turn a selected file into a data URL after checking its type
pub fn file_to_data_url(mime: &str, bytes: Vec<u8>) -> Result<String, FormError> {
    validate_image_mime(mime)?;
    Ok(DataUrl::new(mime, bytes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_names() {
        assert_eq!(PhotoSlot::Before.attachment_name(), "antes");
        assert_eq!(PhotoSlot::After.attachment_name(), "despues");
        assert_eq!(PhotoSlot::from_key("After"), Some(PhotoSlot::After));
        assert_eq!(PhotoSlot::from_key("signature"), None);
    }

    #[test]
    fn test_store_set_and_clear() {
        let mut store = PhotoStore::default();
        assert!(store.is_empty());
        assert!(store.opens_picker_on_click(PhotoSlot::Before));

        store.set(PhotoSlot::Before, "data:image/png;base64,AA==".to_string());
        assert!(store.has(PhotoSlot::Before));
        assert!(!store.has(PhotoSlot::After));
        assert!(!store.opens_picker_on_click(PhotoSlot::Before));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_mime_validation() {
        assert!(validate_image_mime("image/jpeg").is_ok());
        assert!(validate_image_mime("image/heic").is_ok());
        assert!(matches!(
            validate_image_mime("application/pdf"),
            Err(FormError::InvalidImageType(_))
        ));
        assert!(validate_image_mime("").is_err());
    }

    #[test]
    fn test_file_to_data_url() {
        let url = file_to_data_url("image/png", b"hello".to_vec()).unwrap();
        assert_eq!(url, "data:image/png;base64,aGVsbG8=");
        assert!(file_to_data_url("text/plain", b"hello".to_vec()).is_err());
    }
}
