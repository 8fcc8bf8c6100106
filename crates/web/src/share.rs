//! Browser share sheet, `window.open` fallback and print-window reports

use checklist_form::{FormError, Report, ReportRenderer, SharePayload, ShareTarget};
use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FilePropertyBag, HtmlImageElement, Navigator};

use crate::error::describe_js;

fn share_error(value: JsValue) -> FormError {
    FormError::Share(describe_js(&value))
}

/// `navigator.share` when present, `window.open` otherwise
pub struct BrowserShare {
    navigator: Option<Navigator>,
}

impl BrowserShare {
    pub fn new() -> Self {
        Self {
            navigator: web_sys::window().map(|w| w.navigator()),
        }
    }

    fn method(&self, name: &str) -> Option<Function> {
        let navigator = self.navigator.as_ref()?;
        Reflect::get(navigator, &JsValue::from_str(name))
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    /// `{ text, files }` as the share API expects it
    fn share_data(payload: &SharePayload) -> Result<Object, JsValue> {
        let files = Array::new();
        for attachment in &payload.files {
            let parts = Array::of1(&Uint8Array::from(attachment.bytes.as_slice()));
            let options = FilePropertyBag::new();
            options.set_type(&attachment.mime);
            let file = File::new_with_u8_array_sequence_and_options(&parts, &attachment.file_name, &options)?;
            files.push(&file);
        }

        let data = Object::new();
        Reflect::set(&data, &"text".into(), &JsValue::from_str(&payload.text))?;
        Reflect::set(&data, &"files".into(), &files)?;
        Ok(data)
    }
}

impl Default for BrowserShare {
    fn default() -> Self {
        Self::new()
    }
}

impl ShareTarget for BrowserShare {
    fn can_share(&self, payload: &SharePayload) -> bool {
        let (Some(navigator), Some(_), Some(can_share)) =
            (self.navigator.as_ref(), self.method("share"), self.method("canShare"))
        else {
            return false;
        };
        let Ok(data) = Self::share_data(payload) else {
            return false;
        };
        can_share
            .call1(navigator, &data)
            .map(|result| result.is_truthy())
            .unwrap_or(false)
    }

    async fn share(&mut self, payload: &SharePayload) -> Result<(), FormError> {
        let navigator = self
            .navigator
            .as_ref()
            .ok_or_else(|| FormError::Share("no navigator".to_string()))?;
        let share = self
            .method("share")
            .ok_or_else(|| FormError::Share("share API unavailable".to_string()))?;

        let data = Self::share_data(payload).map_err(share_error)?;
        let promise = share
            .call1(navigator, &data)
            .map_err(share_error)?
            .dyn_into::<js_sys::Promise>()
            .map_err(share_error)?;
        JsFuture::from(promise).await.map_err(share_error)?;
        debug!("navigator.share resolved");
        Ok(())
    }

    fn open_url(&mut self, url: &str) -> Result<(), FormError> {
        let window = web_sys::window().ok_or_else(|| FormError::Share("no window".to_string()))?;
        window
            .open_with_url_and_target(url, "_blank")
            .map_err(share_error)?;
        Ok(())
    }
}

/// Opens the report in a new window and triggers the print dialog, where the
/// browser's "Save as PDF" produces the file
pub struct PrintRenderer;

impl ReportRenderer for PrintRenderer {
    async fn render(&mut self, report: &Report) -> Result<(), FormError> {
        let report_error = |value: JsValue| FormError::Report(describe_js(&value));

        let window = web_sys::window().ok_or_else(|| FormError::Report("no window".to_string()))?;
        let popup = window
            .open_with_url_and_target("", "_blank")
            .map_err(report_error)?
            .ok_or_else(|| FormError::Report("popup blocked".to_string()))?;
        let document = popup
            .document()
            .ok_or_else(|| FormError::Report("popup has no document".to_string()))?;
        let root = document
            .document_element()
            .ok_or_else(|| FormError::Report("popup has no root element".to_string()))?;

        root.set_inner_html(&report.to_html());
        document.set_title(&report.file_name());

        // Photos and signature are data URLs; print only after they decode
        let images = document.query_selector_all("img").map_err(report_error)?;
        for image in (0..images.length()).filter_map(|i| images.item(i)) {
            let Ok(image) = image.dyn_into::<HtmlImageElement>() else {
                continue;
            };
            if let Err(e) = JsFuture::from(image.decode()).await {
                warn!("Report image failed to decode: {}", describe_js(&e));
            }
        }

        popup.print().map_err(report_error)?;
        Ok(())
    }
}
