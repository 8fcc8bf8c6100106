//! Cubic Bézier segments used to smooth pen input

use glam::Vec2;

use crate::constants::CURVE_LENGTH_STEPS;

/// A cubic segment between two input points with start/end widths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
    pub start_width: f32,
    pub end_width: f32,
}

impl Bezier {
    /// Build the segment from `points[1]` to `points[2]` using the two
    /// neighbours to derive tangent-continuous control points.
    pub fn from_points(points: [Vec2; 4], start_width: f32, end_width: f32) -> Self {
        let (_, c2) = control_points(points[0], points[1], points[2]);
        let (c3, _) = control_points(points[1], points[2], points[3]);
        Self {
            start: points[1],
            control1: c2,
            control2: c3,
            end: points[2],
            start_width,
            end_width,
        }
    }

    /// Point on the curve at `t` in 0..=1
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.start * (u * u * u)
            + self.control1 * (3.0 * u * u * t)
            + self.control2 * (3.0 * u * t * t)
            + self.end * (t * t * t)
    }

    /// Approximate arc length by sampling
    pub fn length(&self) -> f32 {
        let mut length = 0.0;
        let mut previous = self.start;
        for i in 1..=CURVE_LENGTH_STEPS {
            let current = self.point_at(i as f32 / CURVE_LENGTH_STEPS as f32);
            length += previous.distance(current);
            previous = current;
        }
        length
    }
}

/// Control points around `s2` for the segment pair `s1 -> s2 -> s3`
///
/// Returns (control before s2, control after s2).
fn control_points(s1: Vec2, s2: Vec2, s3: Vec2) -> (Vec2, Vec2) {
    let m1 = (s1 + s2) / 2.0;
    let m2 = (s2 + s3) / 2.0;

    let l1 = s1.distance(s2);
    let l2 = s2.distance(s3);

    let k = if l1 + l2 == 0.0 { 0.0 } else { l2 / (l1 + l2) };
    let cm = m2 + (m1 - m2) * k;
    let offset = s2 - cm;

    (m1 + offset, m2 + offset)
}
