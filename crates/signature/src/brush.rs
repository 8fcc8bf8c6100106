//! Velocity-sensitive pen for dab generation
//!
//! The pen turns input points into smoothed Bézier segments whose width
//! shrinks as the pen moves faster, then samples those segments into
//! circular dabs for the canvas. Width depends on velocity only; reported
//! pressure is recorded but not used for rendering.

use tracing::debug;

use crate::curve::Bezier;
use crate::types::{PenOptions, Point};

/// Output from the pen for a single dab
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DabOutput {
    /// X position in logical coordinates
    pub x: f32,
    /// Y position in logical coordinates
    pub y: f32,
    /// Radius in logical pixels
    pub radius: f32,
}

/// Pen state for one stroke at a time
///
/// Keeps a sliding window of the last four points so every segment gets
/// control points from both neighbours.
pub struct VelocityBrush {
    options: PenOptions,
    /// Sliding window of recent points (at most 4 while a curve is built)
    last_points: Vec<Point>,
    /// Filtered velocity of the previous segment
    last_velocity: f32,
    /// End width of the previous segment
    last_width: f32,
}

impl VelocityBrush {
    /// Create a new pen with the given options
    pub fn new(options: PenOptions) -> Self {
        let mut brush = Self {
            options,
            last_points: Vec::with_capacity(4),
            last_velocity: 0.0,
            last_width: 0.0,
        };
        brush.reset();
        brush
    }

    pub fn options(&self) -> &PenOptions {
        &self.options
    }

    /// Start a new stroke with the given options
    pub fn begin_stroke(&mut self, options: PenOptions) {
        self.options = options;
        self.reset();
    }

    fn reset(&mut self) {
        self.last_points.clear();
        self.last_velocity = 0.0;
        self.last_width = (self.options.min_width + self.options.max_width) / 2.0;
    }

    /// Width for a given filtered velocity
    pub fn stroke_width(&self, velocity: f32) -> f32 {
        (self.options.max_width / (velocity + 1.0)).max(self.options.min_width)
    }

    /// Feed a point; returns the segment that became drawable, if any
    ///
    /// The first two points of a stroke never produce a segment. The
    /// third produces the first one (with the first point duplicated as
    /// its leading neighbour).
    pub fn add_point(&mut self, point: Point) -> Option<Bezier> {
        self.last_points.push(point);

        if self.last_points.len() <= 2 {
            return None;
        }

        if self.last_points.len() == 3 {
            let first = self.last_points[0];
            self.last_points.insert(0, first);
        }

        let (start_width, end_width) = self.segment_widths(self.last_points[1], self.last_points[2]);
        let curve = Bezier::from_points(
            [
                self.last_points[0].position(),
                self.last_points[1].position(),
                self.last_points[2].position(),
                self.last_points[3].position(),
            ],
            start_width,
            end_width,
        );

        self.last_points.remove(0);
        Some(curve)
    }

    fn segment_widths(&mut self, start: Point, end: Point) -> (f32, f32) {
        let weight = self.options.velocity_filter_weight;
        let velocity = weight * end.velocity_from(&start) + (1.0 - weight) * self.last_velocity;
        let new_width = self.stroke_width(velocity);

        let widths = (self.last_width, new_width);
        self.last_velocity = velocity;
        self.last_width = new_width;
        widths
    }

    /// Dab for a stroke's first (or only) point
    pub fn dot(&self, point: &Point) -> DabOutput {
        DabOutput {
            x: point.x,
            y: point.y,
            radius: self.options.dot_size,
        }
    }

    /// Sample a segment into dabs roughly one logical pixel apart
    pub fn dabs_for_curve(&self, curve: &Bezier) -> Vec<DabOutput> {
        let width_delta = curve.end_width - curve.start_width;
        let steps = curve.length().ceil() as u32;

        let dabs: Vec<DabOutput> = (0..steps)
            .map(|i| {
                let t = i as f32 / steps as f32;
                let position = curve.point_at(t);
                let width = (curve.start_width + t * t * t * width_delta).min(self.options.max_width);
                DabOutput {
                    x: position.x,
                    y: position.y,
                    radius: width,
                }
            })
            .collect();

        if !dabs.is_empty() {
            debug!(
                "VelocityBrush: {} dabs from ({:.1}, {:.1}) to ({:.1}, {:.1}), width {:.2} -> {:.2}",
                dabs.len(),
                curve.start.x,
                curve.start.y,
                curve.end.x,
                curve.end.y,
                curve.start_width,
                curve.end_width
            );
        }

        dabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn options() -> PenOptions {
        PenOptions {
            pen_color: Color::BLACK,
            dot_size: 1.5,
            min_width: 0.5,
            max_width: 2.5,
            velocity_filter_weight: 0.7,
        }
    }

    #[test]
    fn test_stroke_width_bounds() {
        let brush = VelocityBrush::new(options());
        assert!((brush.stroke_width(0.0) - 2.5).abs() < 0.001);
        assert!((brush.stroke_width(1.5) - 1.0).abs() < 0.001);
        // Very fast movement bottoms out at min width
        assert!((brush.stroke_width(100.0) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_first_two_points_produce_no_curve() {
        let mut brush = VelocityBrush::new(options());
        assert!(brush.add_point(Point::new(0.0, 0.0, 0.5, 0.0)).is_none());
        assert!(brush.add_point(Point::new(10.0, 0.0, 0.5, 16.0)).is_none());

        let curve = brush.add_point(Point::new(20.0, 0.0, 0.5, 32.0)).unwrap();
        // First segment runs from the first to the second point
        assert_eq!(curve.start.x, 0.0);
        assert_eq!(curve.end.x, 10.0);
    }

    #[test]
    fn test_each_later_point_produces_a_curve() {
        let mut brush = VelocityBrush::new(options());
        let mut curves = 0;
        for i in 0..6 {
            if brush.add_point(Point::new(i as f32 * 10.0, 0.0, 0.5, i as f64 * 16.0)).is_some() {
                curves += 1;
            }
        }
        assert_eq!(curves, 4);
    }

    #[test]
    fn test_faster_strokes_are_thinner() {
        let mut slow = VelocityBrush::new(options());
        let mut fast = VelocityBrush::new(options());
        let mut slow_width = 0.0;
        let mut fast_width = 0.0;

        for i in 0..5 {
            let x = i as f32 * 10.0;
            if let Some(c) = slow.add_point(Point::new(x, 0.0, 0.5, i as f64 * 100.0)) {
                slow_width = c.end_width;
            }
            if let Some(c) = fast.add_point(Point::new(x, 0.0, 0.5, i as f64 * 2.0)) {
                fast_width = c.end_width;
            }
        }

        assert!(fast_width < slow_width);
    }

    #[test]
    fn test_dabs_for_curve_spacing() {
        let mut brush = VelocityBrush::new(options());
        brush.add_point(Point::new(0.0, 0.0, 0.5, 0.0));
        brush.add_point(Point::new(20.0, 0.0, 0.5, 16.0));
        let curve = brush.add_point(Point::new(40.0, 0.0, 0.5, 32.0)).unwrap();

        let dabs = brush.dabs_for_curve(&curve);
        // ~20 logical pixels long, one dab per pixel
        assert!(dabs.len() >= 19 && dabs.len() <= 21);
        assert!(dabs.iter().all(|d| d.radius <= 2.5 && d.radius >= 0.5));
    }

    #[test]
    fn test_begin_stroke_resets_window() {
        let mut brush = VelocityBrush::new(options());
        brush.add_point(Point::new(0.0, 0.0, 0.5, 0.0));
        brush.add_point(Point::new(10.0, 0.0, 0.5, 16.0));

        brush.begin_stroke(options());
        assert!(brush.add_point(Point::new(50.0, 50.0, 0.5, 100.0)).is_none());
    }
}
