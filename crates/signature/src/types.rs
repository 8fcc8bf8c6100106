use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_TIME_DELTA_MS;
use crate::error::SignatureError;

/// An opaque sRGB color as used for pens and backgrounds
///
/// Serializes as a `#RRGGBB` string so stroke data stays interchangeable
/// with the browser drawing library's `toData()` format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or `rgb(r, g, b)`
    pub fn parse(value: &str) -> Result<Self, SignatureError> {
        let trimmed = value.trim();
        let invalid = || SignatureError::InvalidColor(value.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Self::rgb(r * 17, g * 17, b * 17)),
                [r1, r2, g1, g2, b1, b2] => {
                    Ok(Self::rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2))
                }
                _ => Err(invalid()),
            };
        }

        let inner = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid())?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            _ => Err(invalid()),
        }
    }

    /// Linear RGBA in 0..1, the format the CPU surface stores
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }

    /// `#RRGGBB`
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = SignatureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// A single input sample in logical (CSS pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    /// Reported pressure 0..1 (0.5 for devices without pressure)
    pub pressure: f32,
    /// Event timestamp in milliseconds
    pub time: f64,
}

impl Point {
    pub fn new(x: f32, y: f32, pressure: f32, time: f64) -> Self {
        Self {
            x,
            y,
            pressure,
            time,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn distance_to(&self, other: &Point) -> f32 {
        self.position().distance(other.position())
    }

    /// Speed in logical pixels per millisecond from `start` to `self`
    pub fn velocity_from(&self, start: &Point) -> f32 {
        let elapsed = self.time - start.time;
        if elapsed.abs() < MIN_TIME_DELTA_MS {
            return 0.0;
        }
        (self.distance_to(start) as f64 / elapsed) as f32
    }
}

/// One captured stroke together with the pen options it was drawn with
///
/// Field names follow the drawing library's `toData()` JSON so exported
/// data can be replayed by either side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointGroup {
    pub pen_color: Color,
    pub dot_size: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub velocity_filter_weight: f32,
    pub points: Vec<Point>,
}

/// Pen options applied to new strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenOptions {
    pub pen_color: Color,
    pub dot_size: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub velocity_filter_weight: f32,
}

impl PenOptions {
    /// Start an empty group that will be drawn with these options
    pub fn new_group(&self) -> PointGroup {
        PointGroup {
            pen_color: self.pen_color,
            dot_size: self.dot_size,
            min_width: self.min_width,
            max_width: self.max_width,
            velocity_filter_weight: self.velocity_filter_weight,
            points: Vec::new(),
        }
    }
}

impl From<&PointGroup> for PenOptions {
    fn from(group: &PointGroup) -> Self {
        Self {
            pen_color: group.pen_color,
            dot_size: group.dot_size,
            min_width: group.min_width,
            max_width: group.max_width,
            velocity_filter_weight: group.velocity_filter_weight,
        }
    }
}

/// Serialize stroke data to the JSON shape used by `toData()`
pub fn groups_to_json(groups: &[PointGroup]) -> Result<String, SignatureError> {
    Ok(serde_json::to_string(groups)?)
}

/// Parse stroke data produced by `toData()`
pub fn groups_from_json(json: &str) -> Result<Vec<PointGroup>, SignatureError> {
    Ok(serde_json::from_str(json)?)
}
