//! Signature canvas in the page
//!
//! Strokes are rasterized by the software pad; this module measures the
//! element and copies changed pixels into it with `putImageData`.

use signature::{CanvasElement, Point, SignaturePad, StrokeCapture};
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData, PointerEvent};

use crate::error::WebError;

/// Layout source for the signature surface
#[derive(Clone)]
pub struct DomCanvas {
    element: HtmlCanvasElement,
}

impl DomCanvas {
    pub fn new(element: HtmlCanvasElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }

    /// Pointer position in logical canvas coordinates
    pub fn point_from_event(&self, event: &PointerEvent) -> Point {
        let rect = self.element.get_bounding_client_rect();
        let x = event.client_x() as f64 - rect.left();
        let y = event.client_y() as f64 - rect.top();
        let pressure = match event.pressure() {
            p if p > 0.0 => p,
            _ => 0.5,
        };
        Point::new(x as f32, y as f32, pressure, event.time_stamp())
    }
}

impl CanvasElement for DomCanvas {
    fn displayed_size(&self) -> (f32, f32) {
        (self.element.offset_width() as f32, self.element.offset_height() as f32)
    }

    fn device_pixel_ratio(&self) -> Option<f32> {
        web_sys::window().map(|w| w.device_pixel_ratio() as f32)
    }
}

/// Presents pad pixels on the page canvas
pub struct SignatureView {
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl SignatureView {
    pub fn new(element: HtmlCanvasElement) -> Result<Self, WebError> {
        let context = element
            .get_context("2d")?
            .ok_or(WebError::MissingContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| WebError::MissingContext)?;
        Ok(Self { element, context })
    }

    /// Match the element's backing store to the pad and repaint all of it
    pub fn sync(&self, pad: &mut SignaturePad) -> Result<(), WebError> {
        let store = pad.backing_store();
        if self.element.width() != store.width || self.element.height() != store.height {
            // Assigning a size also wipes the element's pixels
            self.element.set_width(store.width);
            self.element.set_height(store.height);
        }
        pad.take_dirty();
        self.put_region(pad, (0, 0, store.width, store.height))
    }

    /// Copy whatever changed since the last present
    pub fn present(&self, pad: &mut SignaturePad) -> Result<(), WebError> {
        match pad.take_dirty() {
            Some(rect) => self.put_region(pad, rect),
            None => Ok(()),
        }
    }

    fn put_region(&self, pad: &SignaturePad, (x, y, width, height): (u32, u32, u32, u32)) -> Result<(), WebError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let bytes = pad.canvas().surface().region_to_rgba8(x, y, width, height);
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&bytes), width, height)?;
        self.context.put_image_data(&data, x as f64, y as f64)?;
        Ok(())
    }
}
