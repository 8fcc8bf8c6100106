/// Result of exporting a canvas that has no pixels (matches `toDataURL` on a 0x0 canvas).
pub const EMPTY_DATA_URL: &str = "data:,";

/// Pixel density never drops below this, even if the display reports less.
pub const MIN_PIXEL_RATIO: f32 = 1.0;

/// Sample count used to approximate Bézier curve length.
pub const CURVE_LENGTH_STEPS: u32 = 10;

/// Velocity samples closer in time than this are treated as simultaneous (ms).
pub const MIN_TIME_DELTA_MS: f64 = 1e-6;
