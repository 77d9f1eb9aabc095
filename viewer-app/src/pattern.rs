//! Synthetic decoder output used to feed the renderer.

use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use viewer_frame::{DecodedFrame, Frame, TrackWriter};

const BAR_COLORS: [[u8; 4]; 7] = [
    [192, 192, 192, 255],
    [192, 192, 0, 255],
    [0, 192, 192, 255],
    [0, 192, 0, 255],
    [192, 0, 192, 255],
    [192, 0, 0, 255],
    [0, 0, 192, 255],
];

/// Color bars scrolled horizontally by `index` pixels.
pub fn color_bars(width: u32, height: u32, index: u64, timestamp_us: u64) -> DecodedFrame {
    let width_px = width as usize;
    let mut row = Vec::with_capacity(width_px * 4);
    for x in 0..width_px {
        let shifted = (x as u64 + index) % width.max(1) as u64;
        let bar = (shifted as usize * BAR_COLORS.len()) / width_px.max(1);
        row.extend_from_slice(&BAR_COLORS[bar.min(BAR_COLORS.len() - 1)]);
    }

    let mut data = Vec::with_capacity(row.len() * height as usize);
    for _ in 0..height {
        data.extend_from_slice(&row);
    }

    DecodedFrame::new(Bytes::from(data), width, height, timestamp_us)
}

/// Push color bars into `writer` at `frame_rate` until the reader goes away.
///
/// Frames are offered without waiting, like a live decoder: when the track is
/// full the frame is dropped.
pub fn spawn_producer(
    writer: TrackWriter,
    width: u32,
    height: u32,
    frame_rate: u32,
) -> JoinHandle<u64> {
    let period = Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
    let frame_us = period.as_micros() as u64;

    tokio::spawn(async move {
        info!(track = %writer.track_id(), width, height, frame_rate, "Decoder starting");

        let mut interval = tokio::time::interval(period);
        let mut produced = 0u64;
        let mut index = 0u64;
        loop {
            interval.tick().await;
            let frame = Frame::new(color_bars(width, height, index, index * frame_us));
            index += 1;
            match writer.try_send(frame) {
                Ok(true) => produced += 1,
                Ok(false) => {}
                Err(e) => {
                    debug!(track = %writer.track_id(), error = %e, "Track closed");
                    break;
                }
            }
        }

        info!(
            track = %writer.track_id(),
            produced,
            dropped = writer.dropped_frames(),
            "Decoder stopped"
        );
        produced
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewer_frame::{FrameSource, VideoTrack};

    #[test]
    fn test_color_bars_dimensions() {
        let frame = color_bars(14, 2, 0, 0);
        assert!(frame.is_valid());
        assert_eq!(&frame.data[0..4], &BAR_COLORS[0]);
        assert_eq!(&frame.data[13 * 4..14 * 4], &BAR_COLORS[6]);
    }

    #[test]
    fn test_color_bars_scroll() {
        let still = color_bars(14, 1, 0, 0);
        let scrolled = color_bars(14, 1, 2, 0);
        assert_eq!(&scrolled.data[0..4], &still.data[8..12]);
    }

    #[tokio::test]
    async fn test_producer_counts_only_accepted_frames() {
        let (track, writer) = VideoTrack::new("bars", viewer_ipc::TrackKind::Video, 1);
        let mut stream = track.open_stream().unwrap();
        let producer = spawn_producer(writer, 4, 4, 1000);

        // Nothing is read, so every frame after the first finds the track full
        tokio::time::sleep(Duration::from_millis(30)).await;
        stream.cancel();

        assert_eq!(producer.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_producer_stops_when_track_closes() {
        let (track, writer) = VideoTrack::video("bars");
        let mut stream = track.open_stream().unwrap();
        let producer = spawn_producer(writer, 4, 4, 1000);

        let frame = stream.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.display_width(), 4);
        frame.release();

        stream.cancel();
        let produced = producer.await.unwrap();
        assert!(produced >= 1);
    }
}
