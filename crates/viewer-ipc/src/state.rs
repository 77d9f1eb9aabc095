//! Renderer state machine types.

use serde::{Deserialize, Serialize};

/// The current state of a canvas renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererState {
    /// No session is running.
    #[default]
    Idle,

    /// A session is bound to a track and both loops are running.
    Running {
        /// Identifier of the bound track.
        track_id: String,
    },

    /// The display surface has been released; the renderer is unusable.
    Destroyed,
}

impl RendererState {
    /// Returns true if the renderer is idle.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if a session is running.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns true if the renderer has been destroyed.
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Returns the bound track, if any.
    pub fn track_id(&self) -> Option<&str> {
        match self {
            Self::Running { track_id } => Some(track_id),
            _ => None,
        }
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running { .. } => "Running",
            Self::Destroyed => "Destroyed",
        }
    }
}

/// Reason a rendering session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The host called stop.
    Requested,

    /// A different track was bound.
    TrackSwapped,

    /// The frame stream completed.
    StreamEnded,

    /// Reading the next frame failed.
    ReadFailed { message: String },

    /// The display stopped delivering refreshes.
    RefreshEnded,

    /// The renderer was destroyed.
    Destroyed,
}

impl StopReason {
    /// Returns a display message for this reason.
    pub fn message(&self) -> String {
        match self {
            Self::Requested => "Rendering stopped by host".to_string(),
            Self::TrackSwapped => "Switched to another track".to_string(),
            Self::StreamEnded => "Frame stream ended".to_string(),
            Self::ReadFailed { message } => format!("Frame read failed: {message}"),
            Self::RefreshEnded => "Display refresh ended".to_string(),
            Self::Destroyed => "Renderer destroyed".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_helpers() {
        let running = RendererState::Running {
            track_id: "video-0".to_string(),
        };

        assert!(RendererState::default().is_idle());
        assert!(running.is_running());
        assert_eq!(running.track_id(), Some("video-0"));
        assert_eq!(RendererState::Idle.track_id(), None);
        assert_eq!(RendererState::Destroyed.name(), "Destroyed");
    }

    #[test]
    fn test_stop_reason_message() {
        let reason = StopReason::ReadFailed {
            message: "decoder reset".to_string(),
        };
        assert_eq!(reason.message(), "Frame read failed: decoder reset");
        assert_eq!(StopReason::StreamEnded.message(), "Frame stream ended");
        assert_eq!(StopReason::RefreshEnded.message(), "Display refresh ended");
    }
}
