//! Surface that records draws instead of rasterizing them.

use std::sync::Arc;

use parking_lot::Mutex;
use viewer_frame::Frame;

use super::{DisplaySurface, DrawContext};
use crate::geometry::ViewportGeometry;

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Timestamp of the drawn frame.
    pub timestamp_us: u64,

    /// Native frame width.
    pub frame_width: u32,

    /// Native frame height.
    pub frame_height: u32,

    /// Placement used for the draw.
    pub geometry: ViewportGeometry,

    /// Backing store size at draw time.
    pub backing_size: (u32, u32),
}

#[derive(Default)]
struct HeadlessState {
    client_size: (f64, f64),
    backing_size: (u32, u32),
    attached: bool,
    clears: u64,
    draws: Vec<DrawRecord>,
}

/// Shared view of everything a [`HeadlessSurface`] recorded.
#[derive(Clone)]
pub struct DrawLog {
    state: Arc<Mutex<HeadlessState>>,
}

impl DrawLog {
    /// All draws so far.
    pub fn records(&self) -> Vec<DrawRecord> {
        self.state.lock().draws.clone()
    }

    /// Number of draws so far.
    pub fn len(&self) -> usize {
        self.state.lock().draws.len()
    }

    /// Returns true if nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent draw.
    pub fn last(&self) -> Option<DrawRecord> {
        self.state.lock().draws.last().cloned()
    }

    /// Number of clear calls.
    pub fn clears(&self) -> u64 {
        self.state.lock().clears
    }

    /// Current backing store size.
    pub fn backing_size(&self) -> (u32, u32) {
        self.state.lock().backing_size
    }

    /// Change the visual size, as a layout change would.
    pub fn set_client_size(&self, width: f64, height: f64) {
        self.state.lock().client_size = (width, height);
    }

    /// Drop the drawing context, as a lost GPU context would.
    pub fn detach_context(&self) {
        self.state.lock().attached = false;
    }

    /// Reacquire the drawing context.
    pub fn attach_context(&self) {
        self.state.lock().attached = true;
    }
}

struct HeadlessContext {
    state: Arc<Mutex<HeadlessState>>,
}

impl DrawContext for HeadlessContext {
    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {
        self.state.lock().clears += 1;
    }

    fn draw_frame(&mut self, frame: &Frame, geometry: &ViewportGeometry) {
        let mut state = self.state.lock();
        let backing_size = state.backing_size;
        state.draws.push(DrawRecord {
            timestamp_us: frame.timestamp_us(),
            frame_width: frame.display_width(),
            frame_height: frame.display_height(),
            geometry: *geometry,
            backing_size,
        });
    }
}

/// A surface without pixels, for hosts that only need to observe painting.
pub struct HeadlessSurface {
    state: Arc<Mutex<HeadlessState>>,
    context: HeadlessContext,
}

impl HeadlessSurface {
    /// Create a surface occupying `width x height` on screen.
    pub fn new(width: f64, height: f64) -> Self {
        let state = Arc::new(Mutex::new(HeadlessState {
            client_size: (width, height),
            attached: true,
            ..Default::default()
        }));

        Self {
            context: HeadlessContext {
                state: Arc::clone(&state),
            },
            state,
        }
    }

    /// Handle for inspecting the surface after it was handed to a renderer.
    pub fn log(&self) -> DrawLog {
        DrawLog {
            state: Arc::clone(&self.state),
        }
    }
}

impl DisplaySurface for HeadlessSurface {
    fn client_size(&self) -> (f64, f64) {
        self.state.lock().client_size
    }

    fn backing_size(&self) -> (u32, u32) {
        self.state.lock().backing_size
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.state.lock().backing_size = (width, height);
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        if self.state.lock().attached {
            Some(&mut self.context)
        } else {
            None
        }
    }
}
