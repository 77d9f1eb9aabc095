//! Typed renderer<->host messages for the stream viewer.
//!
//! This crate defines the state, event, and configuration types exchanged
//! between the canvas renderer and whatever hosts it.

mod events;
mod state;
mod types;

pub use events::RendererEvent;
pub use state::{RendererState, StopReason};
pub use types::{GeometrySnapshot, RenderMetrics, RendererConfig, TrackKind};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for events (Renderer → Host).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<RendererEvent>, Receiver<RendererEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
