//! Decoded video frames and the sources that produce them.
//!
//! A [`Frame`] is an owned handle to a decoded image that must be released
//! exactly once. A [`FrameSource`] hands out a [`FrameStream`], the
//! pull-based reader the renderer drains.

mod error;
mod frame;
mod source;
mod track;

pub use error::SourceError;
pub use frame::{DecodedFrame, Frame, FrameHandle};
pub use source::{FrameSource, FrameStream};
pub use track::{TrackWriter, VideoTrack};

/// Default number of frames a track buffers ahead of its reader.
pub const TRACK_CHANNEL_CAPACITY: usize = 4;

/// Result type for frame source operations.
pub type SourceResult<T> = Result<T, SourceError>;
