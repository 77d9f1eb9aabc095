//! Frame sources and the streams read from them.

use tokio::sync::mpsc;
use tracing::{debug, trace};
use viewer_ipc::TrackKind;

use crate::frame::Frame;
use crate::SourceResult;

/// Something a renderer can be bound to.
pub trait FrameSource: Send + Sync {
    /// Identifier used in logs and state reports. Not required to be unique.
    fn id(&self) -> &str;

    /// Media kind carried by the source.
    fn kind(&self) -> TrackKind;

    /// Construct a reader over the source's frames.
    fn open_stream(&self) -> SourceResult<FrameStream>;
}

/// Pull-based reader over a source's frames.
///
/// Frames still buffered when the stream is cancelled or dropped are
/// released.
pub struct FrameStream {
    source_id: String,
    receiver: mpsc::Receiver<SourceResult<Frame>>,
    cancelled: bool,
}

impl FrameStream {
    /// Wrap the receiving half of a frame channel.
    pub fn new(source_id: impl Into<String>, receiver: mpsc::Receiver<SourceResult<Frame>>) -> Self {
        Self {
            source_id: source_id.into(),
            receiver,
            cancelled: false,
        }
    }

    /// Identifier of the source this stream reads from.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Await the next frame.
    ///
    /// Returns `Ok(None)` once the producer is gone or the stream was
    /// cancelled.
    pub async fn next_frame(&mut self) -> SourceResult<Option<Frame>> {
        if self.cancelled {
            return Ok(None);
        }

        match self.receiver.recv().await {
            Some(Ok(frame)) => {
                trace!(source = %self.source_id, ts = frame.timestamp_us(), "Frame read");
                Ok(Some(frame))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// Stop reading and release every frame still buffered.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.receiver.close();

        let mut released = 0usize;
        while let Ok(item) = self.receiver.try_recv() {
            if let Ok(frame) = item {
                frame.release();
                released += 1;
            }
        }

        debug!(source = %self.source_id, released, "Frame stream cancelled");
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for FrameStream {
    fn drop(&mut self) {
        self.cancel();
    }
}
