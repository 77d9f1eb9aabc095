//! Error types for the renderer.

use thiserror::Error;
use viewer_frame::SourceError;

/// Failures the renderer contains and reports instead of raising.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The source cannot be read as a frame stream.
    #[error("Unsupported frame source: {0}")]
    UnsupportedSource(String),

    /// Constructing the stream or reader failed.
    #[error("Frame stream construction failed: {0}")]
    SourceConstruction(String),

    /// Awaiting the next frame failed.
    #[error("Frame stream read failed: {0}")]
    StreamRead(String),

    /// The loops need a tokio runtime to run on.
    #[error("No async runtime available")]
    NoRuntime,

    /// The renderer was destroyed.
    #[error("Renderer destroyed")]
    Destroyed,
}

impl From<SourceError> for RenderError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unsupported(_) => Self::UnsupportedSource(err.to_string()),
            SourceError::Read(message) => Self::StreamRead(message),
            other => Self::SourceConstruction(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewer_ipc::TrackKind;

    #[test]
    fn test_source_error_mapping() {
        assert_eq!(
            RenderError::from(SourceError::Unsupported(TrackKind::Audio)),
            RenderError::UnsupportedSource(
                "frame streams are not supported for audio tracks".to_string()
            )
        );
        assert_eq!(
            RenderError::from(SourceError::Read("eof".to_string())),
            RenderError::StreamRead("eof".to_string())
        );
        assert!(matches!(
            RenderError::from(SourceError::AlreadyOpened("v".to_string())),
            RenderError::SourceConstruction(_)
        ));
    }
}
