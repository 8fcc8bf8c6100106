//! Error types for the browser host.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum WebError {
    #[error("No global window")]
    MissingWindow,

    #[error("No document")]
    MissingDocument,

    #[error("Element #{0} not found or has the wrong type")]
    MissingElement(String),

    #[error("No 2d context on the signature canvas")]
    MissingContext,

    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Js(describe_js(&value))
    }
}

impl From<WebError> for JsValue {
    fn from(error: WebError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

/// Readable text for a thrown JS value
pub fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", value)
}
