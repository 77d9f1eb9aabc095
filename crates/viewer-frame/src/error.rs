//! Error types for frame sources.

use thiserror::Error;
use viewer_ipc::TrackKind;

/// Errors that can occur while opening or reading a frame stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The track cannot be turned into a frame stream.
    #[error("frame streams are not supported for {0} tracks")]
    Unsupported(TrackKind),

    /// The track's stream has already been handed to a reader.
    #[error("frame stream for track {0} was already opened")]
    AlreadyOpened(String),

    /// Building the stream failed.
    #[error("failed to construct frame stream: {0}")]
    Construction(String),

    /// The producer reported a failure while a frame was awaited.
    #[error("failed to read frame: {0}")]
    Read(String),

    /// The reader side of the track is gone.
    #[error("track closed")]
    Closed,
}
