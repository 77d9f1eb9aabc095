//! Viewer configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use viewer_ipc::RendererConfig;

/// Settings for a viewer run, loaded from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Renderer settings.
    pub renderer: RendererConfig,

    /// On-screen width of the canvas.
    pub surface_width: f64,

    /// On-screen height of the canvas.
    pub surface_height: f64,

    /// Native width of the decoded stream.
    pub frame_width: u32,

    /// Native height of the decoded stream.
    pub frame_height: u32,

    /// Decoder output rate in frames per second (default: 90).
    pub frame_rate: u32,

    /// How long to run before destroying the renderer.
    pub duration_secs: u64,

    /// Interval between metrics reports.
    pub stats_interval_secs: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            renderer: RendererConfig::default(),
            surface_width: 800.0,
            surface_height: 600.0,
            frame_width: 1280,
            frame_height: 720,
            frame_rate: 90,
            duration_secs: 6,
            stats_interval_secs: 1,
        }
    }
}

impl ViewerConfig {
    /// Read a config file, falling back to defaults for missing fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the viewer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            anyhow::bail!(
                "Frame size must be non-zero, got {}x{}",
                self.frame_width,
                self.frame_height
            );
        }
        if !(self.surface_width > 0.0 && self.surface_height > 0.0) {
            anyhow::bail!(
                "Surface size must be positive, got {}x{}",
                self.surface_width,
                self.surface_height
            );
        }
        if self.frame_rate == 0 || self.renderer.refresh_rate_hz == 0 {
            anyhow::bail!("Frame rate and refresh rate must be non-zero");
        }
        if self.renderer.track_capacity == 0 {
            anyhow::bail!("Track capacity must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ViewerConfig = serde_json::from_str(
            r#"{ "surface_width": 1000.0, "surface_height": 400.0, "renderer": { "refresh_rate_hz": 120 } }"#,
        )
        .unwrap();

        assert_eq!(config.surface_width, 1000.0);
        assert_eq!(config.renderer.refresh_rate_hz, 120);
        assert_eq!(config.renderer.track_capacity, 4);
        assert_eq!(config.frame_width, 1280);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = ViewerConfig {
            frame_height: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ViewerConfig {
            surface_width: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ViewerConfig::load("/nonexistent/viewer.json").is_err());
    }
}
