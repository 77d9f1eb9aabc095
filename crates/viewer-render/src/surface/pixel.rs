//! Software RGBA canvas.

use viewer_frame::Frame;

use super::{DisplaySurface, DrawContext};
use crate::geometry::ViewportGeometry;

struct PixelCanvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
    frames_drawn: u64,
}

impl PixelCanvas {
    /// Clip a floating point rectangle to the canvas, in whole pixels.
    fn clip(&self, x: f64, y: f64, width: f64, height: f64) -> Option<(usize, usize, usize, usize)> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }

        let x0 = x.max(0.0).floor() as usize;
        let y0 = y.max(0.0).floor() as usize;
        let x1 = ((x + width).ceil().max(0.0) as usize).min(self.width as usize);
        let y1 = ((y + height).ceil().max(0.0) as usize).min(self.height as usize);

        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }
}

impl DrawContext for PixelCanvas {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };

        let stride = self.width as usize * 4;
        for row in y0..y1 {
            let start = row * stride + x0 * 4;
            let end = row * stride + x1 * 4;
            self.data[start..end].fill(0);
        }
    }

    fn draw_frame(&mut self, frame: &Frame, geometry: &ViewportGeometry) {
        let Some(src) = frame.pixels() else {
            return;
        };
        let Some((x0, y0, x1, y1)) = self.clip(
            geometry.offset_x,
            geometry.offset_y,
            geometry.draw_width,
            geometry.draw_height,
        ) else {
            return;
        };

        let src_w = frame.display_width() as usize;
        let src_h = frame.display_height() as usize;
        if src_w == 0 || src_h == 0 {
            return;
        }
        let stride = self.width as usize * 4;
        let scale_x = src_w as f64 / geometry.draw_width;
        let scale_y = src_h as f64 / geometry.draw_height;

        // Nearest neighbour, sampling at pixel centers
        for row in y0..y1 {
            let sy = (((row as f64 + 0.5 - geometry.offset_y) * scale_y) as usize).min(src_h - 1);
            for col in x0..x1 {
                let sx = (((col as f64 + 0.5 - geometry.offset_x) * scale_x) as usize).min(src_w - 1);
                let si = (sy * src_w + sx) * 4;
                let di = row * stride + col * 4;
                self.data[di..di + 4].copy_from_slice(&src[si..si + 4]);
            }
        }

        self.frames_drawn += 1;
    }
}

/// A surface backed by an RGBA pixel buffer in memory.
pub struct PixelSurface {
    client_size: (f64, f64),
    canvas: PixelCanvas,
}

impl PixelSurface {
    /// Create a surface occupying `width x height` on screen.
    ///
    /// The backing store starts at the same size, rounded to whole pixels.
    pub fn new(width: f64, height: f64) -> Self {
        let mut surface = Self {
            client_size: (width, height),
            canvas: PixelCanvas {
                width: 0,
                height: 0,
                data: Vec::new(),
                frames_drawn: 0,
            },
        };
        surface.set_backing_size(width.max(0.0).round() as u32, height.max(0.0).round() as u32);
        surface
    }

    /// Raw RGBA backing store.
    pub fn pixels(&self) -> &[u8] {
        &self.canvas.data
    }

    /// The RGBA value at a backing store coordinate.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = (y as usize * self.canvas.width as usize + x as usize) * 4;
        let px = &self.canvas.data[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Frames rasterized so far.
    pub fn frames_drawn(&self) -> u64 {
        self.canvas.frames_drawn
    }

    /// Change the visual size.
    pub fn set_client_size(&mut self, width: f64, height: f64) {
        self.client_size = (width, height);
    }
}

impl DisplaySurface for PixelSurface {
    fn client_size(&self) -> (f64, f64) {
        self.client_size
    }

    fn backing_size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.canvas.width = width;
        self.canvas.height = height;
        self.canvas.data.clear();
        self.canvas
            .data
            .resize(width as usize * height as usize * 4, 0);
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        Some(&mut self.canvas)
    }
}
