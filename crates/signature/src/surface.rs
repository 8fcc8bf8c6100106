//! CPU backing store for the signature canvas

use image::RgbaImage;

/// An RGBA CPU surface sized in device pixels
/// Stores pixels as [f32; 4] so repeated dab blending doesn't band
pub struct CpuSurface {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order, each pixel is [r, g, b, a] as f32
    pixels: Vec<[f32; 4]>,
}

impl CpuSurface {
    /// Create a new surface with the given dimensions, initialized to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![[0.0, 0.0, 0.0, 0.0]; pixel_count],
        }
    }

    /// Reallocate to new dimensions, discarding all content
    ///
    /// Mirrors assigning `canvas.width`/`canvas.height`, which always wipes the bitmap.
    pub fn reallocate(&mut self, width: u32, height: u32) {
        let pixel_count = (width as usize) * (height as usize);
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(pixel_count, [0.0, 0.0, 0.0, 0.0]);
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: [f32; 4]) {
        self.pixels.fill(color);
    }

    /// True when the surface holds no pixels at all
    #[inline]
    pub fn is_zero_sized(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        Some(self.pixels[index])
    }

    /// Blend a color onto an existing pixel using alpha compositing
    /// Formula: out = src * alpha + dst * (1 - alpha)
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [f32; 4], opacity: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        let dst = self.pixels[index];

        let src_alpha = (color[3] * opacity).clamp(0.0, 1.0);
        let inv_src_alpha = 1.0 - src_alpha;

        self.pixels[index] = [
            color[0] * src_alpha + dst[0] * inv_src_alpha,
            color[1] * src_alpha + dst[1] * inv_src_alpha,
            color[2] * src_alpha + dst[2] * inv_src_alpha,
            src_alpha + dst[3] * inv_src_alpha,
        ];
    }

    /// Quantize to 8-bit RGBA, the layout `ImageData` and PNG expect
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|px| px.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }

    /// Quantize a rectangular region to 8-bit RGBA (clamped to bounds)
    pub fn region_to_rgba8(&self, x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        let mut out = Vec::new();
        for py in y.min(y_end)..y_end {
            let row = (py as usize) * (self.width as usize);
            for px in x.min(x_end)..x_end {
                let pixel = self.pixels[row + px as usize];
                out.extend(pixel.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8));
            }
        }
        out
    }

    /// Copy into an `image` buffer for encoding
    pub fn to_image(&self) -> RgbaImage {
        // Length always matches width * height * 4, so from_raw cannot fail here
        RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }
}
