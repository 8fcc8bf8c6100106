//! Checklist form state
//!
//! Handlers return a [`Notice`] for the host to display instead of touching
//! any UI themselves.

use checklist_config::AppConfig;
use image::RgbaImage;
use signature::{CanvasElement, SignatureSurface, EMPTY_DATA_URL};
use tracing::{debug, info, warn};

use crate::camera::{CameraSession, MediaConstraints};
use crate::error::FormError;
use crate::notice::{messages, Notice};
use crate::photos::{file_to_data_url, PhotoSlot, PhotoStore};
use crate::report::{Report, REPORT_TITLE};
use crate::share::{compose_message, AttachedItems, Attachment, SharePayload, SIGNATURE_ATTACHMENT_NAME};

pub struct ChecklistForm<E: CanvasElement> {
    config: AppConfig,
    fecha: String,
    departamento: String,
    /// Always at least one entry; the first one can't be removed
    personnel: Vec<String>,
    photos: PhotoStore,
    /// Last exported signature image
    signature_image: Option<String>,
    signature: Option<SignatureSurface<E>>,
    camera: CameraSession,
}

impl<E: CanvasElement> ChecklistForm<E> {
    /// Build the form; without a canvas the signature section is inert
    pub fn new(config: AppConfig, canvas: Option<E>) -> Self {
        let signature = SignatureSurface::initialize(canvas, &config.pad, &config.resize);
        let camera = CameraSession::new(config.camera.clone());
        Self {
            config,
            fecha: String::new(),
            departamento: String::new(),
            personnel: vec![String::new()],
            photos: PhotoStore::default(),
            signature_image: None,
            signature,
            camera,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn fecha(&self) -> &str {
        &self.fecha
    }

    pub fn set_fecha(&mut self, fecha: impl Into<String>) {
        self.fecha = fecha.into();
    }

    pub fn departamento(&self) -> &str {
        &self.departamento
    }

    pub fn set_departamento(&mut self, departamento: impl Into<String>) {
        self.departamento = departamento.into();
    }

    // Personnel

    pub fn personnel(&self) -> &[String] {
        &self.personnel
    }

    /// Append an empty entry; returns its index
    pub fn add_personnel(&mut self) -> usize {
        self.personnel.push(String::new());
        self.personnel.len() - 1
    }

    pub fn set_personnel(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.personnel.get_mut(index) {
            Some(entry) => {
                *entry = name.into();
                true
            }
            None => false,
        }
    }

    /// Remove an added entry; the first entry stays
    pub fn remove_personnel(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.personnel.len() {
            return false;
        }
        self.personnel.remove(index);
        true
    }

    /// Trimmed, non-empty names joined with `", "`
    pub fn personnel_summary(&self) -> String {
        self.personnel_names().join(", ")
    }

    fn personnel_names(&self) -> Vec<String> {
        self.personnel
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    // Signature

    pub fn signature(&self) -> Option<&SignatureSurface<E>> {
        self.signature.as_ref()
    }

    pub fn signature_mut(&mut self) -> Option<&mut SignatureSurface<E>> {
        self.signature.as_mut()
    }

    pub fn has_signature(&self) -> bool {
        self.signature.as_ref().is_some_and(|s| !s.is_empty())
    }

    pub fn clear_signature(&mut self) -> Option<Notice> {
        let surface = self.signature.as_mut()?;
        surface.clear();
        self.signature_image = None;
        Some(Notice::success(messages::SIGNATURE_CLEARED))
    }

    pub fn toggle_pen_color(&mut self) -> Option<Notice> {
        let surface = self.signature.as_mut()?;
        let color = surface.toggle_pen_color();
        debug!("Pen color now {}", color);
        Some(Notice::success(messages::PEN_COLOR_CHANGED))
    }

    /// Export the signature if anything was drawn
    fn export_signature(&mut self) -> Option<String> {
        let surface = self.signature.as_ref().filter(|s| !s.is_empty())?;
        let url = surface.export_image();
        if url == EMPTY_DATA_URL {
            return None;
        }
        self.signature_image = Some(url.clone());
        Some(url)
    }

    // Photos

    pub fn photos(&self) -> &PhotoStore {
        &self.photos
    }

    /// A file was chosen for `slot`
    pub fn select_photo_file(&mut self, slot: PhotoSlot, mime: &str, bytes: Vec<u8>) -> Notice {
        match file_to_data_url(mime, bytes) {
            Ok(url) => {
                self.photos.set(slot, url);
                Notice::success(messages::IMAGE_UPDATED)
            }
            Err(e) => {
                warn!("Rejected file for {}: {}", slot.key(), e);
                Notice::from(&e)
            }
        }
    }

    /// Store an already encoded photo
    pub fn set_photo(&mut self, slot: PhotoSlot, data_url: String) {
        self.photos.set(slot, data_url);
    }

    /// Whether clicking the preview should open the file picker
    pub fn preview_click(&self, slot: PhotoSlot) -> bool {
        self.photos.opens_picker_on_click(slot)
    }

    // Camera

    pub fn camera(&self) -> &CameraSession {
        &self.camera
    }

    pub fn start_camera(&mut self, slot: PhotoSlot) -> MediaConstraints {
        self.camera.start(slot)
    }

    pub fn camera_ready(&mut self) -> bool {
        self.camera.stream_ready()
    }

    pub fn camera_failed(&mut self, reason: &str) -> Notice {
        let error = self.camera.stream_failed(reason);
        Notice::from(&error)
    }

    /// Capture the current video frame into the active slot
    pub fn capture_photo(&mut self, frame: &RgbaImage) -> Notice {
        match self.camera.capture(frame) {
            Ok((slot, url)) => {
                self.photos.set(slot, url);
                Notice::success(messages::PHOTO_CAPTURED)
            }
            Err(e) => {
                warn!("Error capturing photo: {}", e);
                Notice::from(&e)
            }
        }
    }

    pub fn stop_camera(&mut self) {
        self.camera.stop();
    }

    pub fn handle_key(&mut self, key: &str) -> bool {
        self.camera.handle_key(key)
    }

    // Share & report

    /// Date and department must hold more than whitespace
    pub fn validate_required(&self) -> Result<(), FormError> {
        let mut missing = Vec::new();
        if self.fecha.trim().is_empty() {
            missing.push("fecha");
        }
        if self.departamento.trim().is_empty() {
            missing.push("departamento");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::MissingRequired(missing))
        }
    }

    /// Message and attachments for sharing
    ///
    /// Attachments are dropped as a whole if any of them can't be decoded,
    /// which leaves the text-only fallback.
    pub fn prepare_share(&mut self) -> Result<SharePayload, FormError> {
        self.validate_required()?;

        let signature = self.export_signature();
        let items = AttachedItems {
            before: self.photos.has(PhotoSlot::Before),
            after: self.photos.has(PhotoSlot::After),
            signature: signature.is_some(),
        };
        let text = compose_message(&self.fecha, &self.departamento, &self.personnel_summary(), items);

        let mut sources: Vec<(&str, &str)> = PhotoSlot::ALL
            .into_iter()
            .filter_map(|slot| self.photos.get(slot).map(|url| (slot.attachment_name(), url)))
            .collect();
        if let Some(url) = signature.as_deref() {
            sources.push((SIGNATURE_ATTACHMENT_NAME, url));
        }

        let files = match sources
            .into_iter()
            .map(|(name, url)| Attachment::from_data_url(name, url))
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(files) => files,
            Err(e) => {
                warn!("Error processing image: {}", e);
                Vec::new()
            }
        };

        Ok(SharePayload { text, files })
    }

    /// Everything the printable report shows
    pub fn report(&mut self) -> Result<Report, FormError> {
        self.validate_required()?;
        let signature = self.export_signature();
        Ok(Report {
            title: REPORT_TITLE.to_string(),
            fecha: self.fecha.clone(),
            departamento: self.departamento.clone(),
            personnel: self.personnel_names(),
            before: self.photos.get(PhotoSlot::Before).map(str::to_string),
            after: self.photos.get(PhotoSlot::After).map(str::to_string),
            signature,
        })
    }

    /// Back to a blank form
    pub fn reset(&mut self) -> Notice {
        self.fecha.clear();
        self.departamento.clear();
        self.personnel = vec![String::new()];
        self.photos.clear();
        self.signature_image = None;
        if let Some(surface) = self.signature.as_mut() {
            surface.clear();
        }
        self.camera.stop();
        info!("Form reset");
        Notice::success(messages::FORM_RESET)
    }

    pub fn signature_image(&self) -> Option<&str> {
        self.signature_image.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signature::{FixedElement, Point};

    fn form() -> ChecklistForm<FixedElement> {
        ChecklistForm::new(
            AppConfig::default(),
            Some(FixedElement::new(200.0, 100.0, Some(1.0))),
        )
    }

    fn filled_form() -> ChecklistForm<FixedElement> {
        let mut form = form();
        form.set_fecha("2024-05-01");
        form.set_departamento("Cocina");
        form
    }

    fn sign(form: &mut ChecklistForm<FixedElement>) {
        let points: Vec<Point> = (0..10)
            .map(|i| Point::new(20.0 + i as f32 * 10.0, 50.0, 0.5, i as f64 * 20.0))
            .collect();
        form.signature_mut().unwrap().record_stroke(&points);
    }

    #[test]
    fn test_personnel_summary() {
        let mut form = form();
        form.set_personnel(0, "  Ana ");
        let second = form.add_personnel();
        let third = form.add_personnel();
        form.set_personnel(third, "Luis");
        assert_eq!(second, 1);
        assert_eq!(form.personnel_summary(), "Ana, Luis");
    }

    #[test]
    fn test_first_personnel_entry_is_kept() {
        let mut form = form();
        assert!(!form.remove_personnel(0));
        form.add_personnel();
        assert!(form.remove_personnel(1));
        assert!(!form.remove_personnel(5));
        assert_eq!(form.personnel().len(), 1);
    }

    #[test]
    fn test_share_requires_fields() {
        let mut form = form();
        form.set_fecha("2024-05-01");
        let err = form.prepare_share().unwrap_err();
        assert!(matches!(err, FormError::MissingRequired(ref fields) if fields == &vec!["departamento"]));
        assert_eq!(Notice::from(&err).message, messages::REQUIRED_FIELDS);
    }

    #[test]
    fn test_whitespace_only_fields_are_missing() {
        let mut form = form();
        form.set_fecha("2024-05-01");
        form.set_departamento("   ");
        let err = form.validate_required().unwrap_err();
        assert!(matches!(err, FormError::MissingRequired(ref fields) if fields == &vec!["departamento"]));

        form.set_departamento(" Cocina ");
        assert!(form.validate_required().is_ok());
    }

    #[test]
    fn test_share_text_only() {
        let mut form = filled_form();
        let payload = form.prepare_share().unwrap();
        assert!(payload.files.is_empty());
        assert!(payload.text.ends_with("🏢 Departamento: Cocina\n"));
    }

    #[test]
    fn test_share_with_photo_and_signature() {
        let mut form = filled_form();
        form.set_personnel(0, "Ana");
        let notice = form.select_photo_file(PhotoSlot::After, "image/jpeg", vec![0xFF, 0xD8, 0xFF]);
        assert!(!notice.is_error());
        sign(&mut form);

        let payload = form.prepare_share().unwrap();
        let names: Vec<&str> = payload.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["despues.jpg", "firma.jpg"]);
        assert!(payload.files.iter().all(|f| f.mime == "image/jpeg"));
        assert!(payload.text.contains("👥 Personal: Ana\n\n"));
        assert!(payload.text.contains("📸 Foto Después adjunta\n✍️ Firma adjunta\n"));
        assert!(!payload.text.contains("Foto Antes"));
        assert!(form.signature_image().is_some());
    }

    #[test]
    fn test_share_drops_files_on_bad_attachment() {
        let mut form = filled_form();
        form.set_photo(PhotoSlot::Before, "garbage".to_string());
        let payload = form.prepare_share().unwrap();
        assert!(payload.files.is_empty());
        assert!(payload.text.contains("📸 Foto Antes adjunta"));
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut form = form();
        let notice = form.select_photo_file(PhotoSlot::Before, "application/pdf", vec![1, 2]);
        assert!(notice.is_error());
        assert_eq!(notice.message, messages::INVALID_IMAGE);
        assert!(form.preview_click(PhotoSlot::Before));
    }

    #[test]
    fn test_camera_capture_into_slot() {
        let mut form = form();
        form.start_camera(PhotoSlot::Before);
        assert!(form.camera_ready());

        let frame = RgbaImage::from_pixel(8, 8, image::Rgba([120, 120, 120, 255]));
        let notice = form.capture_photo(&frame);
        assert_eq!(notice.message, messages::PHOTO_CAPTURED);
        assert!(form.photos().has(PhotoSlot::Before));
        assert!(!form.preview_click(PhotoSlot::Before));
        assert!(!form.camera().is_open());
    }

    #[test]
    fn test_capture_without_session() {
        let mut form = form();
        let notice = form.capture_photo(&RgbaImage::new(4, 4));
        assert_eq!(notice.message, messages::CAPTURE_FAILED);
    }

    #[test]
    fn test_reset() {
        let mut form = filled_form();
        form.add_personnel();
        form.set_photo(PhotoSlot::Before, "data:image/jpeg;base64,/9j/".to_string());
        sign(&mut form);

        let notice = form.reset();
        assert_eq!(notice.message, messages::FORM_RESET);
        assert!(form.fecha().is_empty());
        assert_eq!(form.personnel(), &[String::new()]);
        assert!(form.photos().is_empty());
        assert!(!form.has_signature());
    }

    #[test]
    fn test_form_without_canvas() {
        let mut form: ChecklistForm<FixedElement> = ChecklistForm::new(AppConfig::default(), None);
        assert!(form.signature().is_none());
        assert!(form.clear_signature().is_none());
        assert!(form.toggle_pen_color().is_none());

        form.set_fecha("2024-05-01");
        form.set_departamento("Cocina");
        let payload = form.prepare_share().unwrap();
        assert!(!payload.text.contains("Firma"));
    }

    #[test]
    fn test_signature_buttons() {
        let mut form = form();
        sign(&mut form);
        assert!(form.has_signature());

        let notice = form.toggle_pen_color().unwrap();
        assert_eq!(notice.message, messages::PEN_COLOR_CHANGED);

        let notice = form.clear_signature().unwrap();
        assert_eq!(notice.message, messages::SIGNATURE_CLEARED);
        assert!(!form.has_signature());
    }

    #[test]
    fn test_report() {
        let mut form = filled_form();
        form.set_personnel(0, "Ana");
        let report = form.report().unwrap();
        assert_eq!(report.personnel, vec!["Ana".to_string()]);
        assert!(report.signature.is_none());

        form.set_departamento("  ");
        assert!(form.report().is_err());
    }
}
