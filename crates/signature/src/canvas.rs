//! Scaled drawing canvas: a device-pixel backing store plus a logical coordinate transform

use tracing::debug;

use crate::constants::MIN_PIXEL_RATIO;
use crate::surface::CpuSurface;
use crate::types::Color;

/// Backing-store geometry derived from a displayed size and pixel density
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackingStore {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
    /// Device pixels per logical pixel
    pub ratio: f32,
}

impl BackingStore {
    /// Size a backing store so strokes stay crisp on high-density displays
    ///
    /// A missing or sub-1 density is treated as 1. Fractional results are
    /// truncated, as assigning to `canvas.width` does.
    pub fn for_display(displayed_width: f32, displayed_height: f32, ratio: Option<f32>) -> Self {
        let ratio = sanitize_ratio(ratio);
        Self {
            width: (displayed_width.max(0.0) * ratio) as u32,
            height: (displayed_height.max(0.0) * ratio) as u32,
            ratio,
        }
    }

    /// Logical size this store covers
    pub fn logical_size(&self) -> (f32, f32) {
        (self.width as f32 / self.ratio, self.height as f32 / self.ratio)
    }
}

impl Default for BackingStore {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            ratio: MIN_PIXEL_RATIO,
        }
    }
}

/// Clamp a reported pixel density to a usable value
pub fn sanitize_ratio(ratio: Option<f32>) -> f32 {
    match ratio {
        Some(r) if r.is_finite() => r.max(MIN_PIXEL_RATIO),
        _ => MIN_PIXEL_RATIO,
    }
}

/// Pixel-space rectangle (x, y, width, height)
pub type DirtyRect = (u32, u32, u32, u32);

/// Drawing target for the signature pad
///
/// Callers draw in logical coordinates; the canvas scales by the pixel
/// ratio the same way `ctx.scale(ratio, ratio)` does in a 2D context.
pub struct Canvas {
    surface: CpuSurface,
    ratio: f32,
    background: Color,
    dirty: Option<DirtyRect>,
}

impl Canvas {
    pub fn new(store: BackingStore, background: Color) -> Self {
        let mut canvas = Self {
            surface: CpuSurface::new(store.width, store.height),
            ratio: store.ratio,
            background,
            dirty: None,
        };
        canvas.clear();
        canvas
    }

    /// Current backing-store geometry
    pub fn backing_store(&self) -> BackingStore {
        BackingStore {
            width: self.surface.width,
            height: self.surface.height,
            ratio: self.ratio,
        }
    }

    /// Reallocate the backing store and reset the transform
    ///
    /// Content is discarded; callers replay stroke data afterwards.
    pub fn resize(&mut self, store: BackingStore) {
        debug!(
            "Canvas::resize: {}x{} @{} -> {}x{} @{}",
            self.surface.width,
            self.surface.height,
            self.ratio,
            store.width,
            store.height,
            store.ratio
        );
        self.surface.reallocate(store.width, store.height);
        self.ratio = store.ratio;
        self.clear();
    }

    /// Fill with the background color
    pub fn clear(&mut self) {
        self.surface.clear(self.background.to_rgba_f32());
        self.mark_all_dirty();
    }

    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    #[inline]
    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    /// Stamp a filled circle at a logical position
    ///
    /// `radius` is in logical pixels. Edges get one device pixel of
    /// coverage-based antialiasing. Returns the affected device-pixel
    /// region, or None if the dab misses the surface.
    pub fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) -> Option<DirtyRect> {
        let center_x = x * self.ratio;
        let center_y = y * self.ratio;
        let radius = radius * self.ratio;

        if radius <= 0.0 || self.surface.is_zero_sized() {
            return None;
        }

        let reach = radius + 0.5;
        let x_min = ((center_x - reach).floor().max(0.0) as u32).min(self.surface.width);
        let y_min = ((center_y - reach).floor().max(0.0) as u32).min(self.surface.height);
        let x_max = ((center_x + reach).ceil().max(0.0) as u32).min(self.surface.width);
        let y_max = ((center_y + reach).ceil().max(0.0) as u32).min(self.surface.height);

        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        let rgba = color.to_rgba_f32();
        for py in y_min..y_max {
            for px in x_min..x_max {
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;
                let distance = (dx * dx + dy * dy).sqrt();

                let coverage = calculate_edge_coverage(distance, radius);
                if coverage > 0.0 {
                    self.surface.blend_pixel(px, py, rgba, coverage);
                }
            }
        }

        let rect = (x_min, y_min, x_max - x_min, y_max - y_min);
        self.mark_dirty(rect);
        Some(rect)
    }

    /// Sample a device pixel as 8-bit RGBA
    pub fn pixel_rgba8(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.surface
            .get_pixel(x, y)
            .map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
    }

    /// Take the region modified since the last call
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.take()
    }

    /// Check if anything was drawn since the last `take_dirty`
    #[inline]
    pub fn has_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    fn mark_all_dirty(&mut self) {
        if self.surface.is_zero_sized() {
            self.dirty = None;
            return;
        }
        self.dirty = Some((0, 0, self.surface.width, self.surface.height));
    }

    fn mark_dirty(&mut self, rect: DirtyRect) {
        self.dirty = Some(match self.dirty {
            None => rect,
            Some((x, y, w, h)) => {
                let x_min = x.min(rect.0);
                let y_min = y.min(rect.1);
                let x_max = (x + w).max(rect.0 + rect.2);
                let y_max = (y + h).max(rect.1 + rect.3);
                (x_min, y_min, x_max - x_min, y_max - y_min)
            }
        });
    }
}

/// Coverage of a pixel whose center is `distance` from a circle's center
/// 1.0 inside, 0.0 outside, linear over the one-pixel band at the edge
#[inline]
pub fn calculate_edge_coverage(distance: f32, radius: f32) -> f32 {
    (radius + 0.5 - distance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backing_store_scales_by_density() {
        let store = BackingStore::for_display(300.0, 200.0, Some(2.0));
        assert_eq!((store.width, store.height), (600, 400));
        assert_eq!(store.ratio, 2.0);
        assert_eq!(store.logical_size(), (300.0, 200.0));
    }

    #[test]
    fn test_backing_store_density_fallback() {
        let missing = BackingStore::for_display(300.0, 200.0, None);
        assert_eq!((missing.width, missing.height, missing.ratio), (300, 200, 1.0));

        let low = BackingStore::for_display(300.0, 200.0, Some(0.5));
        assert_eq!(low.ratio, 1.0);

        let nan = BackingStore::for_display(300.0, 200.0, Some(f32::NAN));
        assert_eq!(nan.ratio, 1.0);
    }

    #[test]
    fn test_backing_store_truncates() {
        let store = BackingStore::for_display(100.5, 50.0, Some(1.5));
        assert_eq!((store.width, store.height), (150, 75));
    }

    #[test]
    fn test_new_canvas_is_background() {
        let canvas = Canvas::new(BackingStore::for_display(10.0, 10.0, None), Color::WHITE);
        assert_eq!(canvas.pixel_rgba8(5, 5), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_fill_circle_scales_with_ratio() {
        let store = BackingStore::for_display(100.0, 100.0, Some(2.0));
        let mut canvas = Canvas::new(store, Color::WHITE);
        canvas.take_dirty();

        let rect = canvas.fill_circle(25.0, 25.0, 3.0, Color::BLACK).unwrap();
        // Logical (25, 25) lands at device (50, 50)
        assert_eq!(canvas.pixel_rgba8(50, 50), Some([0, 0, 0, 255]));
        // Radius 3 logical = 6 device pixels; (58, 50) is outside
        assert_eq!(canvas.pixel_rgba8(58, 50), Some([255, 255, 255, 255]));
        assert!(rect.2 >= 12 && rect.3 >= 12);
        assert!(canvas.has_dirty());
    }

    #[test]
    fn test_fill_circle_outside_surface() {
        let mut canvas = Canvas::new(BackingStore::for_display(10.0, 10.0, None), Color::WHITE);
        assert!(canvas.fill_circle(-50.0, -50.0, 2.0, Color::BLACK).is_none());
        assert!(canvas.fill_circle(5.0, 5.0, 0.0, Color::BLACK).is_none());
    }

    #[test]
    fn test_dirty_region_union() {
        let mut canvas = Canvas::new(BackingStore::for_display(100.0, 100.0, None), Color::WHITE);
        canvas.take_dirty();

        canvas.fill_circle(10.0, 10.0, 2.0, Color::BLACK);
        canvas.fill_circle(80.0, 60.0, 2.0, Color::BLACK);
        let (x, y, w, h) = canvas.take_dirty().unwrap();
        assert!(x <= 8 && y <= 8);
        assert!(x + w >= 82 && y + h >= 62);
        assert!(!canvas.has_dirty());
    }

    #[test]
    fn test_resize_clears_to_background() {
        let mut canvas = Canvas::new(BackingStore::for_display(20.0, 20.0, None), Color::WHITE);
        canvas.fill_circle(10.0, 10.0, 5.0, Color::BLACK);

        canvas.resize(BackingStore::for_display(20.0, 20.0, Some(2.0)));
        assert_eq!(canvas.backing_store().width, 40);
        assert_eq!(canvas.pixel_rgba8(20, 20), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_edge_coverage() {
        assert_eq!(calculate_edge_coverage(0.0, 2.0), 1.0);
        assert_eq!(calculate_edge_coverage(2.0, 2.0), 0.5);
        assert_eq!(calculate_edge_coverage(3.0, 2.0), 0.0);
    }
}
