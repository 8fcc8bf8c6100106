//! Host element abstraction
//!
//! The signature surface only needs two facts from its host: how large the
//! canvas is displayed and the display's pixel density.

/// A canvas element as laid out by the host
pub trait CanvasElement {
    /// Displayed (logical) size, like `offsetWidth`/`offsetHeight`
    fn displayed_size(&self) -> (f32, f32);

    /// Device pixels per logical pixel, or None if the display doesn't say
    fn device_pixel_ratio(&self) -> Option<f32>;
}

/// Fixed-geometry element for headless use and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedElement {
    pub width: f32,
    pub height: f32,
    pub ratio: Option<f32>,
}

impl FixedElement {
    pub fn new(width: f32, height: f32, ratio: Option<f32>) -> Self {
        Self {
            width,
            height,
            ratio,
        }
    }
}

impl CanvasElement for FixedElement {
    fn displayed_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> Option<f32> {
        self.ratio
    }
}

impl<E: CanvasElement + ?Sized> CanvasElement for &E {
    fn displayed_size(&self) -> (f32, f32) {
        (**self).displayed_size()
    }

    fn device_pixel_ratio(&self) -> Option<f32> {
        (**self).device_pixel_ratio()
    }
}

impl<E: CanvasElement + ?Sized> CanvasElement for std::rc::Rc<E> {
    fn displayed_size(&self) -> (f32, f32) {
        (**self).displayed_size()
    }

    fn device_pixel_ratio(&self) -> Option<f32> {
        (**self).device_pixel_ratio()
    }
}
