//! Channel-backed video tracks fed by a decode pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, instrument, trace, warn};
use viewer_ipc::TrackKind;

use crate::error::SourceError;
use crate::frame::Frame;
use crate::source::{FrameSource, FrameStream};
use crate::SourceResult;

/// A track whose frames are pushed by a [`TrackWriter`].
///
/// The stream can be opened once; the reader owns it from then on.
pub struct VideoTrack {
    id: String,
    kind: TrackKind,
    receiver: Mutex<Option<mpsc::Receiver<SourceResult<Frame>>>>,
}

/// Producer half of a [`VideoTrack`].
#[derive(Clone)]
pub struct TrackWriter {
    track_id: Arc<str>,
    sender: mpsc::Sender<SourceResult<Frame>>,
    dropped: Arc<AtomicU64>,
}

impl VideoTrack {
    /// Create a track with room for `capacity` frames in flight.
    pub fn new(id: impl Into<String>, kind: TrackKind, capacity: usize) -> (Self, TrackWriter) {
        let id = id.into();
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        let track = Self {
            id: id.clone(),
            kind,
            receiver: Mutex::new(Some(receiver)),
        };
        let writer = TrackWriter {
            track_id: Arc::from(id),
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        };

        (track, writer)
    }

    /// Create a video track with the default capacity.
    pub fn video(id: impl Into<String>) -> (Self, TrackWriter) {
        Self::new(id, TrackKind::Video, crate::TRACK_CHANNEL_CAPACITY)
    }

    /// Returns true if the stream has not been opened yet.
    pub fn is_available(&self) -> bool {
        self.receiver.lock().is_some()
    }
}

impl FrameSource for VideoTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    #[instrument(name = "track_open_stream", skip(self), fields(track = %self.id))]
    fn open_stream(&self) -> SourceResult<FrameStream> {
        if self.kind != TrackKind::Video {
            return Err(SourceError::Unsupported(self.kind));
        }

        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| SourceError::AlreadyOpened(self.id.clone()))?;

        debug!("Frame stream opened");
        Ok(FrameStream::new(self.id.clone(), receiver))
    }
}

impl TrackWriter {
    /// Identifier of the track being written.
    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    /// Push a frame, waiting for room in the channel.
    pub async fn send(&self, frame: Frame) -> SourceResult<()> {
        self.sender
            .send(Ok(frame))
            .await
            .map_err(|_| SourceError::Closed)
    }

    /// Push a frame without waiting.
    ///
    /// When the channel is full the frame is released and `Ok(false)` is
    /// returned.
    pub fn try_send(&self, frame: Frame) -> SourceResult<bool> {
        match self.sender.try_send(Ok(frame)) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(item)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(track = %self.track_id, dropped, "Track channel full, dropping frame");
                drop(item);
                Ok(false)
            }
            Err(TrySendError::Closed(_)) => Err(SourceError::Closed),
        }
    }

    /// Report a decode failure to the reader.
    pub async fn fail(&self, message: impl Into<String>) -> SourceResult<()> {
        let message = message.into();
        warn!(track = %self.track_id, %message, "Reporting frame failure");
        self.sender
            .send(Err(SourceError::Read(message)))
            .await
            .map_err(|_| SourceError::Closed)
    }

    /// Frames dropped by `try_send` because the channel was full.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns true once the reader is gone.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
