//! Canvas frame renderer for the stream viewer.
//!
//! [`CanvasRenderer`] drains a [`viewer_frame::FrameStream`] on one task and
//! paints the freshest frame on every display refresh on another. The two
//! meet in a single-frame [`RenderSlot`]; older frames are released unseen.

mod error;
mod geometry;
mod metrics;
mod refresh;
mod renderer;
mod slot;
mod surface;

#[cfg(test)]
mod testing;

pub use error::RenderError;
pub use geometry::ViewportGeometry;
pub use metrics::MetricsCollector;
pub use refresh::{DisplayRefresh, RefreshSignal};
pub use renderer::{BindOutcome, CanvasRenderer};
pub use slot::{Deposit, RenderSlot};
pub use surface::{DisplaySurface, DrawContext, DrawLog, DrawRecord, HeadlessSurface, PixelSurface};

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
