//! Resize-safe signature surface
//!
//! [`SignatureSurface`] owns the host element handle, the stroke capture,
//! the pen color toggle and the resize debouncer. It is only constructed
//! when the host element exists, so callers hold an
//! `Option<SignatureSurface>` instead of re-checking the element on every
//! call.
//!
//! Nothing here returns an error to the rest of the form: failures are
//! logged and degrade to "no visible signature".

use std::time::Duration;

use checklist_config::{PadConfig, ResizeConfig};
use tracing::{debug, info, warn};

use crate::canvas::BackingStore;
use crate::constants::EMPTY_DATA_URL;
use crate::debounce::Debouncer;
use crate::element::CanvasElement;
use crate::pad::{SignaturePad, StrokeCapture};
use crate::types::{Color, Point};

/// Signature drawing area bound to a host element
pub struct SignatureSurface<E: CanvasElement, C: StrokeCapture = SignaturePad> {
    element: E,
    capture: C,
    /// Default color first, alternate second
    pen_colors: [Color; 2],
    resize_debounce: Debouncer,
    /// Completed resize redraws, for diagnostics
    redraws: u64,
}

impl<E: CanvasElement> SignatureSurface<E, SignaturePad> {
    /// Bind a software signature pad to `element`
    ///
    /// Returns None (and logs) when the element is absent; the rest of the
    /// form keeps working without a signature.
    pub fn initialize(element: Option<E>, pad: &PadConfig, resize: &ResizeConfig) -> Option<Self> {
        let Some(element) = element else {
            info!("Signature canvas not found; signature capture disabled");
            return None;
        };
        let capture = SignaturePad::new(backing_store_for(&element), pad);
        Some(Self::assemble(element, capture, pad, resize))
    }
}

impl<E: CanvasElement, C: StrokeCapture> SignatureSurface<E, C> {
    /// Bind an arbitrary capture implementation to `element`
    ///
    /// The capture's canvas is sized for the element, cleared, and set to
    /// the default pen color.
    pub fn with_capture(
        element: Option<E>,
        mut capture: C,
        pad: &PadConfig,
        resize: &ResizeConfig,
    ) -> Option<Self> {
        let Some(element) = element else {
            info!("Signature canvas not found; signature capture disabled");
            return None;
        };
        capture.resize_canvas(backing_store_for(&element));
        capture.clear();
        Some(Self::assemble(element, capture, pad, resize))
    }

    fn assemble(element: E, mut capture: C, pad: &PadConfig, resize: &ResizeConfig) -> Self {
        let pen_colors = [
            Color::parse(&pad.pen_colors[0]).unwrap_or(Color::BLACK),
            Color::parse(&pad.pen_colors[1]).unwrap_or(Color::BLUE),
        ];
        capture.set_pen_color(pen_colors[0]);

        let store = capture.backing_store();
        debug!(
            "SignatureSurface initialized: backing store {}x{} @{}",
            store.width, store.height, store.ratio
        );

        Self {
            element,
            capture,
            pen_colors,
            resize_debounce: Debouncer::from_millis(resize.debounce_ms),
            redraws: 0,
        }
    }

    /// Append a complete stroke
    ///
    /// The first point begins the stroke and the last one ends it; the
    /// capture applies its own throttling and distance filtering. An empty
    /// slice records nothing.
    pub fn record_stroke(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        self.capture.begin_stroke(*first);
        match rest.split_last() {
            Some((last, middle)) => {
                for point in middle {
                    self.capture.continue_stroke(*point);
                }
                self.capture.end_stroke(Some(*last));
            }
            None => self.capture.end_stroke(None),
        }
    }

    /// Pointer down
    pub fn begin_stroke(&mut self, point: Point) {
        self.capture.begin_stroke(point);
    }

    /// Pointer move while down
    pub fn continue_stroke(&mut self, point: Point) {
        self.capture.continue_stroke(point);
    }

    /// Pointer up / cancel
    pub fn end_stroke(&mut self, point: Option<Point>) {
        self.capture.end_stroke(point);
    }

    /// Empty the stroke sequence and the visible pixels. Idempotent.
    pub fn clear(&mut self) {
        self.capture.clear();
    }

    /// Color for subsequently recorded strokes
    pub fn set_pen_color(&mut self, color: Color) {
        self.capture.set_pen_color(color);
    }

    /// Switch between the two configured pen colors; returns the new color
    pub fn toggle_pen_color(&mut self) -> Color {
        let next = if self.capture.pen_color() == self.pen_colors[0] {
            self.pen_colors[1]
        } else {
            self.pen_colors[0]
        };
        self.capture.set_pen_color(next);
        next
    }

    pub fn pen_color(&self) -> Color {
        self.capture.pen_color()
    }

    /// True only when no stroke has been recorded
    pub fn is_empty(&self) -> bool {
        self.capture.is_empty()
    }

    /// Current content as a PNG data URL
    ///
    /// A canvas without pixels, or a failed encode, yields `data:,`.
    pub fn export_image(&self) -> String {
        let store = self.capture.backing_store();
        if store.width == 0 || store.height == 0 {
            return EMPTY_DATA_URL.to_string();
        }
        match self.capture.to_data_url() {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("Signature export failed: {}", e);
                EMPTY_DATA_URL.to_string()
            }
        }
    }

    /// Re-rasterize for the element's current size and density
    ///
    /// Captures stroke data before the backing store is reallocated, then
    /// replays it only if there was something to replay. A stroke still in
    /// progress is finished first so its points are part of the capture.
    pub fn handle_resize(&mut self) {
        if self.capture.is_stroking() {
            debug!("handle_resize: finishing in-progress stroke before capture");
            self.capture.end_stroke(None);
        }

        let data = self.capture.to_data();
        let store = backing_store_for(&self.element);

        self.capture.resize_canvas(store);
        self.capture.clear();
        if !data.is_empty() {
            self.capture.from_data(&data);
        }

        self.redraws += 1;
        debug!(
            "handle_resize: {}x{} @{}, replayed {} strokes",
            store.width,
            store.height,
            store.ratio,
            data.len()
        );
    }

    /// Note a host resize event; the redraw waits for the quiet period
    pub fn on_resize_event(&mut self, now: Duration) {
        self.resize_debounce.trigger(now);
    }

    /// Run the debounced resize if it is due; returns true if it ran
    pub fn poll_resize(&mut self, now: Duration) -> bool {
        if self.resize_debounce.poll(now) {
            self.handle_resize();
            true
        } else {
            false
        }
    }

    /// Time until a pending debounced resize is due
    pub fn resize_pending_for(&self, now: Duration) -> Option<Duration> {
        self.resize_debounce.remaining(now)
    }

    pub fn resize_quiet_period(&self) -> Duration {
        self.resize_debounce.quiet_period()
    }

    pub fn backing_store(&self) -> BackingStore {
        self.capture.backing_store()
    }

    /// Number of resize redraws performed so far
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    pub fn capture(&self) -> &C {
        &self.capture
    }

    pub fn capture_mut(&mut self) -> &mut C {
        &mut self.capture
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }
}

/// Backing store for the element's current layout
pub fn backing_store_for<E: CanvasElement + ?Sized>(element: &E) -> BackingStore {
    let (width, height) = element.displayed_size();
    BackingStore::for_display(width, height, element.device_pixel_ratio())
}
