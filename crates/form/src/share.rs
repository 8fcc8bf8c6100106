//! Sharing the completed checklist
//!
//! Files are shared through the platform share sheet when it accepts them;
//! otherwise the text goes to WhatsApp through a `wa.me` link.

use signature::{encode_jpeg, DataUrl};
use tracing::{debug, warn};

use crate::error::FormError;
use crate::notice::{messages, Notice};
use crate::photos::PhotoSlot;

pub const WHATSAPP_SHARE_URL: &str = "https://wa.me/?text=";

/// MIME type of every shared attachment
pub const ATTACHMENT_MIME: &str = "image/jpeg";

/// Quality used when an attachment has to be converted to JPEG
pub const ATTACHMENT_JPEG_QUALITY: u8 = 90;

/// Base name of the signature attachment
pub const SIGNATURE_ATTACHMENT_NAME: &str = "firma";

/// A file handed to the share sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Decode a stored data URL into `{name}.jpg`
    ///
    /// Non-JPEG images are converted. If conversion isn't possible the
    /// original bytes are kept with their own type.
    pub fn from_data_url(name: &str, data_url: &str) -> Result<Self, FormError> {
        let url = DataUrl::parse(data_url)?;
        if url.is_empty() {
            return Err(FormError::Share(format!("{name}: empty image")));
        }

        let file_name = format!("{name}.jpg");
        if url.mime == ATTACHMENT_MIME {
            return Ok(Self {
                file_name,
                mime: url.mime,
                bytes: url.bytes,
            });
        }

        match image::load_from_memory(&url.bytes) {
            Ok(decoded) => {
                let jpeg = encode_jpeg(&decoded.to_rgba8(), ATTACHMENT_JPEG_QUALITY)?;
                Ok(Self {
                    file_name,
                    mime: ATTACHMENT_MIME.to_string(),
                    bytes: jpeg.bytes,
                })
            }
            Err(e) => {
                warn!("Keeping {} as {}: {}", file_name, url.mime, e);
                Ok(Self {
                    file_name,
                    mime: url.mime,
                    bytes: url.bytes,
                })
            }
        }
    }
}

/// Text plus files to share
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharePayload {
    pub text: String,
    pub files: Vec<Attachment>,
}

/// Which items the message announces as attached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachedItems {
    pub before: bool,
    pub after: bool,
    pub signature: bool,
}

impl AttachedItems {
    pub fn any(&self) -> bool {
        self.before || self.after || self.signature
    }
}

/// Compose the share message
///
/// `personnel` is the already joined list; it is omitted when empty.
pub fn compose_message(fecha: &str, departamento: &str, personnel: &str, items: AttachedItems) -> String {
    let mut message = format!(
        "🧹 *Control de Limpieza*\n\n📅 Fecha: {fecha}\n🏢 Departamento: {departamento}\n"
    );

    if !personnel.is_empty() {
        message.push_str(&format!("👥 Personal: {personnel}\n\n"));
    }

    if items.before {
        message.push_str(&format!("📸 Foto {} adjunta\n", PhotoSlot::Before.label()));
    }
    if items.after {
        message.push_str(&format!("📸 Foto {} adjunta\n", PhotoSlot::After.label()));
    }
    if items.signature {
        message.push_str("✍️ Firma adjunta\n");
    }

    message
}

/// `wa.me` link carrying `message` as its text
pub fn whatsapp_url(message: &str) -> String {
    format!("{}{}", WHATSAPP_SHARE_URL, urlencoding::encode(message))
}

/// Platform sharing facilities
#[allow(async_fn_in_trait)]
pub trait ShareTarget {
    /// Whether the native share sheet accepts this payload
    fn can_share(&self, payload: &SharePayload) -> bool;

    /// Share through the native sheet
    async fn share(&mut self, payload: &SharePayload) -> Result<(), FormError>;

    /// Open a URL in a new tab
    fn open_url(&mut self, url: &str) -> Result<(), FormError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The native share sheet handled it
    Native,
    /// Fell back to the WhatsApp link
    WhatsApp,
}

impl ShareOutcome {
    pub fn notice(self) -> Notice {
        match self {
            ShareOutcome::Native => Notice::success(messages::SHARED),
            ShareOutcome::WhatsApp => Notice::success(messages::OPENING_WHATSAPP),
        }
    }
}

/// Share natively when there are files and the target accepts them,
/// otherwise (or if native sharing fails) open the WhatsApp link
pub async fn dispatch<T: ShareTarget>(
    target: &mut T,
    payload: &SharePayload,
) -> Result<ShareOutcome, FormError> {
    if !payload.files.is_empty() && target.can_share(payload) {
        match target.share(payload).await {
            Ok(()) => {
                debug!("Shared {} files natively", payload.files.len());
                return Ok(ShareOutcome::Native);
            }
            Err(e) => warn!("Error sharing files: {}", e),
        }
    }

    target.open_url(&whatsapp_url(&payload.text))?;
    Ok(ShareOutcome::WhatsApp)
}

/// [`dispatch`] reduced to the notice the user sees
pub async fn share_with_notice<T: ShareTarget>(target: &mut T, payload: &SharePayload) -> Notice {
    match dispatch(target, payload).await {
        Ok(outcome) => outcome.notice(),
        Err(e) => {
            warn!("Error sharing: {}", e);
            Notice::from(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use signature::encode_png;

    #[derive(Default)]
    struct FakeTarget {
        accepts_files: bool,
        fail_native: bool,
        fail_open: bool,
        shared: Vec<SharePayload>,
        opened: Vec<String>,
    }

    impl ShareTarget for FakeTarget {
        fn can_share(&self, _payload: &SharePayload) -> bool {
            self.accepts_files
        }

        async fn share(&mut self, payload: &SharePayload) -> Result<(), FormError> {
            if self.fail_native {
                return Err(FormError::Share("AbortError".to_string()));
            }
            self.shared.push(payload.clone());
            Ok(())
        }

        fn open_url(&mut self, url: &str) -> Result<(), FormError> {
            if self.fail_open {
                return Err(FormError::Share("popup blocked".to_string()));
            }
            self.opened.push(url.to_string());
            Ok(())
        }
    }

    fn payload_with_file() -> SharePayload {
        SharePayload {
            text: "hola".to_string(),
            files: vec![Attachment {
                file_name: "antes.jpg".to_string(),
                mime: ATTACHMENT_MIME.to_string(),
                bytes: vec![0xFF, 0xD8],
            }],
        }
    }

    #[test]
    fn test_message_full() {
        let items = AttachedItems {
            before: true,
            after: true,
            signature: true,
        };
        let message = compose_message("2024-05-01", "Cocina", "Ana, Luis", items);
        assert_eq!(
            message,
            "🧹 *Control de Limpieza*\n\n📅 Fecha: 2024-05-01\n🏢 Departamento: Cocina\n\
             👥 Personal: Ana, Luis\n\n📸 Foto Antes adjunta\n📸 Foto Después adjunta\n✍️ Firma adjunta\n"
        );
    }

    #[test]
    fn test_message_without_personnel_or_items() {
        let message = compose_message("2024-05-01", "Baños", "", AttachedItems::default());
        assert_eq!(
            message,
            "🧹 *Control de Limpieza*\n\n📅 Fecha: 2024-05-01\n🏢 Departamento: Baños\n"
        );
    }

    #[test]
    fn test_whatsapp_url_encodes() {
        let url = whatsapp_url("a b\n*c*");
        assert_eq!(url, "https://wa.me/?text=a%20b%0A%2Ac%2A");
    }

    #[test]
    fn test_attachment_converts_png_to_jpeg() {
        let png = encode_png(&RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]))).unwrap();
        let attachment = Attachment::from_data_url("firma", &png.to_string()).unwrap();
        assert_eq!(attachment.file_name, "firma.jpg");
        assert_eq!(attachment.mime, ATTACHMENT_MIME);
        assert_eq!(&attachment.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_attachment_keeps_jpeg_bytes() {
        let url = DataUrl::new("image/jpeg", vec![0xFF, 0xD8, 0x01]).to_string();
        let attachment = Attachment::from_data_url("antes", &url).unwrap();
        assert_eq!(attachment.bytes, vec![0xFF, 0xD8, 0x01]);
    }

    #[test]
    fn test_attachment_rejects_bad_urls() {
        assert!(Attachment::from_data_url("antes", "data:,").is_err());
        assert!(Attachment::from_data_url("antes", "not a url").is_err());
    }

    #[tokio::test]
    async fn test_dispatch_native() {
        let mut target = FakeTarget {
            accepts_files: true,
            ..Default::default()
        };
        let outcome = dispatch(&mut target, &payload_with_file()).await.unwrap();
        assert_eq!(outcome, ShareOutcome::Native);
        assert_eq!(target.shared.len(), 1);
        assert!(target.opened.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_text_only_uses_whatsapp() {
        let mut target = FakeTarget {
            accepts_files: true,
            ..Default::default()
        };
        let payload = SharePayload {
            text: "hola".to_string(),
            files: Vec::new(),
        };
        let outcome = dispatch(&mut target, &payload).await.unwrap();
        assert_eq!(outcome, ShareOutcome::WhatsApp);
        assert_eq!(target.opened, vec!["https://wa.me/?text=hola".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_falls_back_when_native_fails() {
        let mut target = FakeTarget {
            accepts_files: true,
            fail_native: true,
            ..Default::default()
        };
        let notice = share_with_notice(&mut target, &payload_with_file()).await;
        assert_eq!(notice.message, messages::OPENING_WHATSAPP);
        assert_eq!(target.opened.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_unsupported_files_fall_back() {
        let mut target = FakeTarget::default();
        let outcome = dispatch(&mut target, &payload_with_file()).await.unwrap();
        assert_eq!(outcome, ShareOutcome::WhatsApp);
        assert!(target.shared.is_empty());
    }

    #[tokio::test]
    async fn test_open_failure_is_error_notice() {
        let mut target = FakeTarget {
            fail_open: true,
            ..Default::default()
        };
        let notice = share_with_notice(&mut target, &payload_with_file()).await;
        assert!(notice.is_error());
        assert_eq!(notice.message, messages::SHARE_FAILED);
    }
}
