//! Letterbox/pillarbox placement of a frame inside a surface.

use viewer_ipc::GeometrySnapshot;

/// Where a frame is drawn on the surface, in surface (CSS) units.
///
/// A zero `draw_width` marks the geometry as stale; the next painted frame
/// recomputes it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportGeometry {
    pub offset_x: f64,
    pub offset_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
}

impl ViewportGeometry {
    /// Fit a `frame_width x frame_height` frame into the surface, preserving
    /// its aspect ratio and centering it.
    ///
    /// A surface wider than the frame gets pillarboxed (full height), anything
    /// else gets letterboxed (full width). Degenerate inputs produce the stale
    /// geometry.
    pub fn fit(surface_width: f64, surface_height: f64, frame_width: u32, frame_height: u32) -> Self {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(surface_width) || !usable(surface_height) || frame_width == 0 || frame_height == 0 {
            return Self::default();
        }

        let surface_ratio = surface_width / surface_height;
        let frame_ratio = frame_width as f64 / frame_height as f64;

        if surface_ratio > frame_ratio {
            let draw_height = surface_height;
            let draw_width = draw_height * frame_ratio;
            Self {
                offset_x: (surface_width - draw_width) / 2.0,
                offset_y: 0.0,
                draw_width,
                draw_height,
            }
        } else {
            let draw_width = surface_width;
            let draw_height = draw_width / frame_ratio;
            Self {
                offset_x: 0.0,
                offset_y: (surface_height - draw_height) / 2.0,
                draw_width,
                draw_height,
            }
        }
    }

    /// Returns true if the geometry must be recomputed before drawing.
    pub fn is_uninitialized(&self) -> bool {
        self.draw_width == 0.0
    }

    /// Mark the geometry stale.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Serializable view of the geometry for host events.
    pub fn snapshot(&self, frame_width: u32, frame_height: u32) -> GeometrySnapshot {
        GeometrySnapshot {
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            draw_width: self.draw_width,
            draw_height: self.draw_height,
            frame_width,
            frame_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_letterbox_on_narrow_surface() {
        let geometry = ViewportGeometry::fit(800.0, 600.0, 1280, 720);

        assert_close(geometry.draw_width, 800.0);
        assert_close(geometry.draw_height, 450.0);
        assert_close(geometry.offset_x, 0.0);
        assert_close(geometry.offset_y, 75.0);
    }

    #[test]
    fn test_pillarbox_on_wide_surface() {
        let geometry = ViewportGeometry::fit(1000.0, 400.0, 1280, 720);

        assert_close(geometry.draw_height, 400.0);
        assert_close(geometry.draw_width, 711.11);
        assert_close(geometry.offset_x, 144.44);
        assert_close(geometry.offset_y, 0.0);
    }

    #[test]
    fn test_matching_aspect_fills_surface() {
        let geometry = ViewportGeometry::fit(1920.0, 1080.0, 1280, 720);

        assert_close(geometry.draw_width, 1920.0);
        assert_close(geometry.draw_height, 1080.0);
        assert_close(geometry.offset_x, 0.0);
        assert_close(geometry.offset_y, 0.0);
    }

    #[test]
    fn test_degenerate_inputs_stay_stale() {
        assert!(ViewportGeometry::fit(0.0, 600.0, 1280, 720).is_uninitialized());
        assert!(ViewportGeometry::fit(800.0, 0.0, 1280, 720).is_uninitialized());
        assert!(ViewportGeometry::fit(800.0, f64::NAN, 1280, 720).is_uninitialized());
        assert!(ViewportGeometry::fit(800.0, 600.0, 0, 720).is_uninitialized());
        assert!(ViewportGeometry::fit(800.0, 600.0, 1280, 0).is_uninitialized());
    }

    #[test]
    fn test_invalidate() {
        let mut geometry = ViewportGeometry::fit(800.0, 600.0, 1280, 720);
        assert!(!geometry.is_uninitialized());

        geometry.invalidate();
        assert!(geometry.is_uninitialized());
    }
}
