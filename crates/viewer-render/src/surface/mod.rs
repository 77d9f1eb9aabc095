//! Display surfaces the renderer paints onto.

mod headless;
mod pixel;

pub use headless::{DrawLog, DrawRecord, HeadlessSurface};
pub use pixel::PixelSurface;

use viewer_frame::Frame;

use crate::geometry::ViewportGeometry;

/// A drawable surface, e.g. a canvas element.
///
/// The renderer only changes the backing pixel size and the content.
pub trait DisplaySurface: Send {
    /// Visual size the surface occupies on screen.
    fn client_size(&self) -> (f64, f64);

    /// Size of the pixel backing store.
    fn backing_size(&self) -> (u32, u32);

    /// Resize the pixel backing store.
    fn set_backing_size(&mut self, width: u32, height: u32);

    /// The 2D drawing context, if one could be acquired.
    fn context(&mut self) -> Option<&mut dyn DrawContext>;
}

/// 2D drawing operations used by the paint step.
pub trait DrawContext {
    /// Clear a rectangle of the backing store.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Draw a frame scaled into the geometry's rectangle.
    fn draw_frame(&mut self, frame: &Frame, geometry: &ViewportGeometry);
}
