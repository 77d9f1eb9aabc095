//! Shared fixtures for renderer tests.

use std::sync::Arc;

use parking_lot::Mutex;
use viewer_frame::{Frame, FrameHandle};

use crate::geometry::ViewportGeometry;
use crate::surface::{DisplaySurface, DrawContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Drawn(u64),
    Closed(u64),
}

/// Ordered record of draws and releases, keyed by frame timestamp.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self, ts: u64) -> Frame {
        self.sized_frame(ts, 1280, 720)
    }

    pub fn sized_frame(&self, ts: u64, width: u32, height: u32) -> Frame {
        Frame::new(JournalHandle {
            ts,
            width,
            height,
            journal: self.clone(),
        })
    }

    pub fn surface(&self, width: f64, height: f64) -> JournalSurface {
        JournalSurface {
            client_size: (width, height),
            backing_size: (0, 0),
            context: JournalContext {
                journal: self.clone(),
            },
        }
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    pub fn close_count(&self, ts: u64) -> usize {
        self.count(Entry::Closed(ts))
    }

    pub fn draw_count(&self, ts: u64) -> usize {
        self.count(Entry::Drawn(ts))
    }

    pub fn drawn(&self) -> Vec<u64> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                Entry::Drawn(ts) => Some(*ts),
                Entry::Closed(_) => None,
            })
            .collect()
    }

    pub fn total_closed(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| matches!(entry, Entry::Closed(_)))
            .count()
    }

    fn count(&self, wanted: Entry) -> usize {
        self.entries.lock().iter().filter(|e| **e == wanted).count()
    }

    fn push(&self, entry: Entry) {
        self.entries.lock().push(entry);
    }
}

struct JournalHandle {
    ts: u64,
    width: u32,
    height: u32,
    journal: Journal,
}

impl FrameHandle for JournalHandle {
    fn display_width(&self) -> u32 {
        self.width
    }

    fn display_height(&self) -> u32 {
        self.height
    }

    fn timestamp_us(&self) -> u64 {
        self.ts
    }

    fn close(&mut self) {
        self.journal.push(Entry::Closed(self.ts));
    }
}

pub struct JournalSurface {
    client_size: (f64, f64),
    backing_size: (u32, u32),
    context: JournalContext,
}

struct JournalContext {
    journal: Journal,
}

impl DrawContext for JournalContext {
    fn clear_rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64) {}

    fn draw_frame(&mut self, frame: &Frame, _geometry: &ViewportGeometry) {
        self.journal.push(Entry::Drawn(frame.timestamp_us()));
    }
}

impl DisplaySurface for JournalSurface {
    fn client_size(&self) -> (f64, f64) {
        self.client_size
    }

    fn backing_size(&self) -> (u32, u32) {
        self.backing_size
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing_size = (width, height);
    }

    fn context(&mut self) -> Option<&mut dyn DrawContext> {
        Some(&mut self.context)
    }
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..2000 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
    condition()
}
