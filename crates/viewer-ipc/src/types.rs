//! Common types used across renderer messages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Display refresh rate driving the paint loop (default: 60).
    pub refresh_rate_hz: u32,

    /// Frames a track may buffer ahead of the renderer (default: 4).
    pub track_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            track_capacity: 4,
        }
    }
}

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    /// Decoded video frames.
    Video,

    /// Audio samples.
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Letterbox placement of a stream inside the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,

    /// Native width of the frame the geometry was computed from.
    pub frame_width: u32,

    /// Native height of the frame the geometry was computed from.
    pub frame_height: u32,
}

/// Render counters since the renderer was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderMetrics {
    /// Frames pulled from the stream.
    pub frames_received: u64,

    /// Frames painted onto the surface.
    pub frames_drawn: u64,

    /// Frames replaced in the slot before they could be painted.
    pub frames_dropped: u64,

    /// Frames released undrawn during teardown.
    pub frames_discarded: u64,

    /// Refresh ticks that found no frame to paint.
    pub idle_ticks: u64,

    /// Sessions started.
    pub sessions: u64,
}

impl RenderMetrics {
    /// Fraction of received frames that were never painted.
    pub fn drop_ratio(&self) -> f32 {
        if self.frames_received == 0 {
            0.0
        } else {
            (self.frames_dropped + self.frames_discarded) as f32 / self.frames_received as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: RendererConfig = serde_json::from_str(r#"{ "refresh_rate_hz": 144 }"#).unwrap();
        assert_eq!(config.refresh_rate_hz, 144);
        assert_eq!(config.track_capacity, 4);
    }

    #[test]
    fn test_drop_ratio() {
        let metrics = RenderMetrics {
            frames_received: 10,
            frames_dropped: 3,
            frames_discarded: 1,
            ..Default::default()
        };
        assert!((metrics.drop_ratio() - 0.4).abs() < f32::EPSILON);
        assert_eq!(RenderMetrics::default().drop_ratio(), 0.0);
    }
}
