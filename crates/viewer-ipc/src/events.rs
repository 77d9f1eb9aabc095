//! Events sent from the renderer to its host.

use serde::{Deserialize, Serialize};

use crate::state::{RendererState, StopReason};
use crate::types::{GeometrySnapshot, RenderMetrics};

/// Events that the renderer can send to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RendererEvent {
    /// Renderer state has changed.
    StateChanged {
        /// Previous state.
        previous: RendererState,

        /// Current state.
        current: RendererState,

        /// Why the session ended, when the transition left `Running`.
        reason: Option<StopReason>,
    },

    /// Letterbox geometry was computed for a new stream.
    GeometryChanged(GeometrySnapshot),

    /// Updated render metrics.
    Metrics(RenderMetrics),

    /// A contained failure (the renderer degraded to idle).
    Error {
        /// Error message.
        message: String,
    },
}
