//! Cleaning checklist WASM build
//!
//! Binds the checklist form and signature surface to the page's DOM. The
//! page loads this module once; [`main`] performs the whole setup.

use tracing::error;
use wasm_bindgen::prelude::*;

mod app;
mod camera;
mod canvas;
mod dom;
mod error;
mod personnel;
mod resize;
mod share;
mod storage;

pub use error::WebError;

/// Main entry point for the WASM module
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    #[cfg(target_arch = "wasm32")]
    {
        // Set up panic hook for better error messages in browser console
        console_error_panic_hook::set_once();

        // Route tracing from every crate to the browser console
        let layer = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_console_config(tracing_wasm::ConsoleConfig::ReportWithConsoleColor)
            .build();
        tracing_wasm::set_as_global_default_with_config(layer);
    }

    app::run().map_err(|e| {
        error!("Checklist failed to start: {}", e);
        JsValue::from(e)
    })
}
