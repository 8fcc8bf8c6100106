//! DOM lookups, timers and small view updates

use std::time::Duration;

use checklist_form::{Notice, PhotoSlot};
use tracing::error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlImageElement, Window};

use crate::error::WebError;

pub fn window() -> Result<Window, WebError> {
    web_sys::window().ok_or(WebError::MissingWindow)
}

pub fn document() -> Result<Document, WebError> {
    window()?.document().ok_or(WebError::MissingDocument)
}

/// Element by id, None if missing or of another type
pub fn find_element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, WebError> {
    find_element(document, id).ok_or_else(|| WebError::MissingElement(id.to_string()))
}

/// Session clock from `performance.now()`
pub fn now() -> Duration {
    let millis = web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    Duration::from_secs_f64(millis.max(0.0) / 1000.0)
}

/// Run `callback` once after `delay`; returns the timer handle
pub fn set_timeout(callback: impl FnOnce() + 'static, delay: Duration) -> Result<i32, WebError> {
    let closure = Closure::once_into_js(callback);
    let handle = window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.unchecked_ref(),
        delay.as_millis().min(i32::MAX as u128) as i32,
    )?;
    Ok(handle)
}

pub fn clear_timeout(handle: i32) {
    if let Some(window) = web_sys::window() {
        window.clear_timeout_with_handle(handle);
    }
}

/// Show a toast and fade it out after `display_ms`
pub fn show_notice(document: &Document, notice: &Notice, display_ms: u32) {
    let Some(toast) = find_element::<HtmlElement>(document, "toast") else {
        return;
    };

    toast.set_text_content(Some(&notice.message));
    toast.set_class_name(&notice.css_class());
    let _ = toast.style().set_property("opacity", "1");

    let fading = toast.clone();
    let hide = move || {
        let _ = fading.style().set_property("opacity", "0");
    };
    if let Err(e) = set_timeout(hide, Duration::from_millis(display_ms as u64)) {
        error!("Failed to schedule toast fade: {}", e);
    }
}

fn preview_id(slot: PhotoSlot) -> String {
    format!("preview{}", slot.element_suffix())
}

/// Replace the slot's preview image
pub fn set_preview(document: &Document, slot: PhotoSlot, data_url: &str) -> Result<(), WebError> {
    let preview: HtmlElement = get_element(document, &preview_id(slot))?;

    if let Some(old) = preview.query_selector("img")? {
        old.remove();
    }
    if let Some(placeholder) = preview.query_selector(".placeholder-logo")? {
        if let Ok(placeholder) = placeholder.dyn_into::<HtmlElement>() {
            let _ = placeholder.style().set_property("display", "none");
        }
    }

    let image: HtmlImageElement = document.create_element("img")?.unchecked_into();
    image.set_src(data_url);
    preview.append_child(&image)?;
    Ok(())
}

/// Remove the slot's preview image and show the placeholder again
pub fn clear_preview(document: &Document, slot: PhotoSlot) -> Result<(), WebError> {
    let Some(preview) = find_element::<HtmlElement>(document, &preview_id(slot)) else {
        return Ok(());
    };

    if let Some(image) = preview.query_selector("img")? {
        image.remove();
    }
    if let Some(placeholder) = preview.query_selector(".placeholder-logo")? {
        if let Ok(placeholder) = placeholder.dyn_into::<HtmlElement>() {
            let _ = placeholder.style().set_property("display", "flex");
        }
    }
    Ok(())
}
