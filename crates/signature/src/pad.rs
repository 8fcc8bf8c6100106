//! Freehand stroke capture
//!
//! [`StrokeCapture`] is the capability the signature surface drives:
//! begin/continue/end a stroke, query emptiness, export pixels, and
//! export/import the stroke sequence for redraws. [`SignaturePad`] is the
//! software implementation that renders into a CPU [`Canvas`].

use checklist_config::PadConfig;
use tracing::{debug, warn};

use crate::brush::{DabOutput, VelocityBrush};
use crate::canvas::{BackingStore, Canvas, DirtyRect};
use crate::data_url::{encode_png, DataUrl};
use crate::error::SignatureError;
use crate::types::{Color, PenOptions, Point, PointGroup};

/// Freehand stroke capture capability
pub trait StrokeCapture {
    /// Start a new stroke at `point`
    fn begin_stroke(&mut self, point: Point);

    /// Extend the current stroke (starts one if none is active)
    fn continue_stroke(&mut self, point: Point);

    /// Finish the current stroke, optionally with a final point
    fn end_stroke(&mut self, point: Option<Point>);

    /// Check if a stroke is currently in progress
    fn is_stroking(&self) -> bool;

    /// Drop all strokes and repaint the background
    fn clear(&mut self);

    /// True when no stroke has been captured
    fn is_empty(&self) -> bool;

    /// Current pixels as an image data URL
    fn to_data_url(&self) -> Result<DataUrl, SignatureError>;

    /// Captured strokes with the pen options each was drawn with
    fn to_data(&self) -> Vec<PointGroup>;

    /// Replace the stroke sequence with `groups` and draw them
    fn from_data(&mut self, groups: &[PointGroup]);

    fn pen_color(&self) -> Color;

    /// Color for strokes begun after this call
    fn set_pen_color(&mut self, color: Color);

    /// Reallocate the pixel surface (content is discarded)
    fn resize_canvas(&mut self, store: BackingStore);

    fn backing_store(&self) -> BackingStore;
}

/// Software signature pad
pub struct SignaturePad {
    canvas: Canvas,
    brush: VelocityBrush,
    /// Options applied to the next stroke
    options: PenOptions,
    min_distance: f32,
    throttle_ms: f64,
    /// Captured strokes, most recent last
    data: Vec<PointGroup>,
    stroking: bool,
}

impl SignaturePad {
    /// Create a pad over a backing store using the given tuning
    ///
    /// Unparseable colors in the config fall back to black pen on white.
    pub fn new(store: BackingStore, config: &PadConfig) -> Self {
        let pen_color = parse_or(&config.pen_colors[0], Color::BLACK);
        let background = parse_or(&config.background, Color::WHITE);

        let options = PenOptions {
            pen_color,
            dot_size: config.effective_dot_size(),
            min_width: config.min_width,
            max_width: config.max_width,
            velocity_filter_weight: config.velocity_filter_weight,
        };

        Self {
            canvas: Canvas::new(store, background),
            brush: VelocityBrush::new(options),
            options,
            min_distance: config.min_distance,
            throttle_ms: config.throttle_ms as f64,
            data: Vec::new(),
            stroking: false,
        }
    }

    /// Get the canvas for direct pixel access
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Take the region drawn since the last call (for blitting to a host canvas)
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.canvas.take_dirty()
    }

    /// Options the next stroke will use
    pub fn pen_options(&self) -> &PenOptions {
        &self.options
    }

    fn stroke_update(&mut self, point: Point, throttled: bool) {
        if !self.stroking {
            self.begin_stroke(point);
            return;
        }

        let Some(group) = self.data.last() else {
            return;
        };

        if let Some(last) = group.points.last() {
            if throttled && point.time - last.time < self.throttle_ms {
                debug!("stroke_update: throttled point at t={:.1}", point.time);
                return;
            }
            if point.distance_to(last) <= self.min_distance {
                return;
            }
        }

        let first = group.points.is_empty();
        self.render_point(point, first);
        if let Some(group) = self.data.last_mut() {
            group.points.push(point);
        }
    }

    /// Draw one accepted point; live input and replay share this path
    fn render_point(&mut self, point: Point, first: bool) {
        let color = self.brush.options().pen_color;

        if first {
            let dot = self.brush.dot(&point);
            self.brush.add_point(point);
            self.stamp(dot, color);
            return;
        }

        if let Some(curve) = self.brush.add_point(point) {
            for dab in self.brush.dabs_for_curve(&curve) {
                self.stamp(dab, color);
            }
        }
    }

    fn stamp(&mut self, dab: DabOutput, color: Color) {
        self.canvas.fill_circle(dab.x, dab.y, dab.radius, color);
    }
}

impl StrokeCapture for SignaturePad {
    fn begin_stroke(&mut self, point: Point) {
        self.brush.begin_stroke(self.options);
        self.data.push(self.options.new_group());
        self.stroking = true;
        self.stroke_update(point, false);
    }

    fn continue_stroke(&mut self, point: Point) {
        self.stroke_update(point, true);
    }

    fn end_stroke(&mut self, point: Option<Point>) {
        if !self.stroking {
            return;
        }
        if let Some(point) = point {
            self.stroke_update(point, false);
        }
        self.stroking = false;

        // A stroke whose every point was filtered contributes nothing
        if self.data.last().is_some_and(|g| g.points.is_empty()) {
            self.data.pop();
        }
    }

    fn is_stroking(&self) -> bool {
        self.stroking
    }

    fn clear(&mut self) {
        self.data.clear();
        self.stroking = false;
        self.canvas.clear();
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn to_data_url(&self) -> Result<DataUrl, SignatureError> {
        encode_png(&self.canvas.surface().to_image())
    }

    fn to_data(&self) -> Vec<PointGroup> {
        self.data.clone()
    }

    fn from_data(&mut self, groups: &[PointGroup]) {
        self.clear();

        for group in groups {
            self.brush.begin_stroke(PenOptions::from(group));
            for (i, point) in group.points.iter().enumerate() {
                self.render_point(*point, i == 0);
            }
            if !group.points.is_empty() {
                self.data.push(group.clone());
            }
        }

        debug!(
            "SignaturePad::from_data: replayed {} strokes ({} points)",
            self.data.len(),
            self.data.iter().map(|g| g.points.len()).sum::<usize>()
        );
    }

    fn pen_color(&self) -> Color {
        self.options.pen_color
    }

    fn set_pen_color(&mut self, color: Color) {
        self.options.pen_color = color;
    }

    fn resize_canvas(&mut self, store: BackingStore) {
        self.canvas.resize(store);
    }

    fn backing_store(&self) -> BackingStore {
        self.canvas.backing_store()
    }
}

fn parse_or(value: &str, fallback: Color) -> Color {
    Color::parse(value).unwrap_or_else(|e| {
        warn!("{}; using {}", e, fallback);
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(width: f32, height: f32, ratio: f32) -> SignaturePad {
        SignaturePad::new(
            BackingStore::for_display(width, height, Some(ratio)),
            &PadConfig::default(),
        )
    }

    /// Horizontal stroke at `y`, points 10px and 20ms apart
    fn draw_line(pad: &mut SignaturePad, x0: f32, x1: f32, y: f32, t0: f64) {
        let mut x = x0;
        let mut t = t0;
        pad.begin_stroke(Point::new(x, y, 0.5, t));
        while x < x1 {
            x += 10.0;
            t += 20.0;
            pad.continue_stroke(Point::new(x, y, 0.5, t));
        }
        pad.end_stroke(None);
    }

    #[test]
    fn test_new_pad_is_empty() {
        let pad = pad(300.0, 200.0, 1.0);
        assert!(pad.is_empty());
        assert!(!pad.is_stroking());
        assert_eq!(pad.pen_color(), Color::BLACK);
    }

    #[test]
    fn test_single_tap_draws_dot() {
        let mut pad = pad(100.0, 100.0, 1.0);
        pad.begin_stroke(Point::new(50.0, 50.0, 0.5, 0.0));
        pad.end_stroke(None);

        assert!(!pad.is_empty());
        assert_eq!(pad.to_data()[0].points.len(), 1);
        assert_eq!(pad.canvas().pixel_rgba8(50, 50), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_line_is_rendered() {
        let mut pad = pad(200.0, 100.0, 1.0);
        draw_line(&mut pad, 10.0, 100.0, 50.0, 0.0);

        assert_eq!(pad.to_data().len(), 1);
        // A point in the middle of the line is inked
        let px = pad.canvas().pixel_rgba8(40, 50).unwrap();
        assert!(px[0] < 128);
    }

    #[test]
    fn test_throttle_drops_fast_points() {
        let mut pad = pad(200.0, 100.0, 1.0);
        pad.begin_stroke(Point::new(10.0, 10.0, 0.5, 0.0));
        pad.continue_stroke(Point::new(30.0, 10.0, 0.5, 5.0));
        pad.continue_stroke(Point::new(50.0, 10.0, 0.5, 20.0));
        pad.end_stroke(None);

        assert_eq!(pad.to_data()[0].points.len(), 2);
    }

    #[test]
    fn test_min_distance_drops_close_points() {
        let mut pad = pad(200.0, 100.0, 1.0);
        pad.begin_stroke(Point::new(10.0, 10.0, 0.5, 0.0));
        pad.continue_stroke(Point::new(12.0, 10.0, 0.5, 50.0));
        pad.end_stroke(Some(Point::new(13.0, 11.0, 0.5, 100.0)));

        assert_eq!(pad.to_data()[0].points.len(), 1);
    }

    #[test]
    fn test_continue_without_begin_starts_stroke() {
        let mut pad = pad(100.0, 100.0, 1.0);
        pad.continue_stroke(Point::new(20.0, 20.0, 0.5, 0.0));
        assert!(pad.is_stroking());
        assert!(!pad.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut pad = pad(100.0, 100.0, 1.0);
        draw_line(&mut pad, 10.0, 60.0, 50.0, 0.0);

        pad.clear();
        assert!(pad.is_empty());
        assert_eq!(pad.canvas().pixel_rgba8(30, 50), Some([255, 255, 255, 255]));

        pad.clear();
        assert!(pad.is_empty());
    }

    #[test]
    fn test_pen_color_applies_to_new_strokes_only() {
        let mut pad = pad(200.0, 100.0, 1.0);
        draw_line(&mut pad, 10.0, 100.0, 20.0, 0.0);

        pad.set_pen_color(Color::BLUE);
        draw_line(&mut pad, 10.0, 100.0, 70.0, 1000.0);

        assert_eq!(pad.canvas().pixel_rgba8(40, 20), Some([0, 0, 0, 255]));
        assert_eq!(pad.canvas().pixel_rgba8(40, 70), Some([0, 0, 255, 255]));

        let data = pad.to_data();
        assert_eq!(data[0].pen_color, Color::BLACK);
        assert_eq!(data[1].pen_color, Color::BLUE);
    }

    #[test]
    fn test_from_data_replays_with_stored_colors() {
        let mut source = pad(200.0, 100.0, 1.0);
        source.set_pen_color(Color::BLUE);
        draw_line(&mut source, 10.0, 100.0, 50.0, 0.0);
        let data = source.to_data();

        let mut target = pad(200.0, 100.0, 1.0);
        target.from_data(&data);

        assert_eq!(target.to_data(), data);
        // Replay uses the stroke's color, not the target's pen color
        assert_eq!(target.pen_color(), Color::BLACK);
        assert_eq!(target.canvas().pixel_rgba8(40, 50), Some([0, 0, 255, 255]));
        // Same density, same pixels
        assert_eq!(
            target.canvas().surface().to_rgba8(),
            source.canvas().surface().to_rgba8()
        );
    }

    #[test]
    fn test_to_data_url_is_png() {
        let mut pad = pad(40.0, 30.0, 2.0);
        draw_line(&mut pad, 5.0, 30.0, 15.0, 0.0);

        let url = pad.to_data_url().unwrap();
        assert_eq!(url.mime, "image/png");
        let decoded = image::load_from_memory(&url.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (80, 60));
    }

    #[test]
    fn test_zero_sized_pad_exports_placeholder() {
        let pad = pad(0.0, 0.0, 1.0);
        let url = pad.to_data_url().unwrap();
        assert_eq!(url.to_string(), "data:,");
    }
}
