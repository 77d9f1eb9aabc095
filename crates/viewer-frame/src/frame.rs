//! Owned video frame handles.

use std::fmt;

use bytes::Bytes;

/// Platform side of a decoded frame.
///
/// `close` is invoked exactly once, by the [`Frame`] that owns the handle.
pub trait FrameHandle: Send + 'static {
    /// Native width in pixels.
    fn display_width(&self) -> u32;

    /// Native height in pixels.
    fn display_height(&self) -> u32;

    /// Presentation timestamp in microseconds.
    fn timestamp_us(&self) -> u64;

    /// Tightly packed RGBA pixels, if the frame lives in CPU memory.
    fn pixels(&self) -> Option<&[u8]> {
        None
    }

    /// Release the underlying image.
    fn close(&mut self);
}

/// A decoded video frame with an explicit, consuming release.
///
/// Dropping a frame that was never released releases it, so every handle is
/// closed exactly once.
pub struct Frame {
    handle: Option<Box<dyn FrameHandle>>,
    width: u32,
    height: u32,
    timestamp_us: u64,
}

impl Frame {
    /// Take ownership of a platform frame.
    pub fn new(handle: impl FrameHandle) -> Self {
        Self::from_boxed(Box::new(handle))
    }

    /// Take ownership of an already boxed platform frame.
    pub fn from_boxed(handle: Box<dyn FrameHandle>) -> Self {
        Self {
            width: handle.display_width(),
            height: handle.display_height(),
            timestamp_us: handle.timestamp_us(),
            handle: Some(handle),
        }
    }

    /// Native width in pixels.
    pub fn display_width(&self) -> u32 {
        self.width
    }

    /// Native height in pixels.
    pub fn display_height(&self) -> u32 {
        self.height
    }

    /// Presentation timestamp in microseconds.
    pub fn timestamp_us(&self) -> u64 {
        self.timestamp_us
    }

    /// Width over height, or `None` for a degenerate frame.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }

    /// RGBA pixels, if available.
    pub fn pixels(&self) -> Option<&[u8]> {
        self.handle.as_deref().and_then(|handle| handle.pixels())
    }

    /// Release the frame. The handle cannot be used afterwards.
    pub fn release(mut self) {
        self.close_handle();
    }

    fn close_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.close_handle();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("timestamp_us", &self.timestamp_us)
            .finish()
    }
}

/// A CPU-resident RGBA frame produced by a software decoder.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// RGBA pixel data, `width * height * 4` bytes.
    pub data: Bytes,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Presentation timestamp in microseconds.
    pub timestamp_us: u64,
}

impl DecodedFrame {
    /// Create a new decoded frame.
    pub fn new(data: Bytes, width: u32, height: u32, timestamp_us: u64) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_us,
        }
    }

    /// Create a frame filled with a single color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4], timestamp_us: u64) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }

        Self::new(Bytes::from(data), width, height, timestamp_us)
    }

    /// Calculate the RGBA buffer size for given dimensions.
    pub fn rgba_buffer_size(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 4
    }

    /// Validate that the pixel data matches the dimensions.
    pub fn is_valid(&self) -> bool {
        self.data.len() == Self::rgba_buffer_size(self.width, self.height)
    }
}

impl FrameHandle for DecodedFrame {
    fn display_width(&self) -> u32 {
        self.width
    }

    fn display_height(&self) -> u32 {
        self.height
    }

    fn timestamp_us(&self) -> u64 {
        self.timestamp_us
    }

    fn pixels(&self) -> Option<&[u8]> {
        if self.is_valid() {
            Some(&self.data)
        } else {
            None
        }
    }

    fn close(&mut self) {
        self.data = Bytes::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandle {
        closes: Arc<AtomicUsize>,
    }

    impl FrameHandle for CountingHandle {
        fn display_width(&self) -> u32 {
            1280
        }

        fn display_height(&self) -> u32 {
            720
        }

        fn timestamp_us(&self) -> u64 {
            42
        }

        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_release_closes_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        let frame = Frame::new(CountingHandle {
            closes: Arc::clone(&closes),
        });

        assert_eq!(frame.display_width(), 1280);
        assert_eq!(frame.timestamp_us(), 42);

        frame.release();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_closes_unreleased_frame() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let _frame = Frame::new(CountingHandle {
                closes: Arc::clone(&closes),
            });
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_solid_frame_exposes_pixels() {
        let frame = Frame::new(DecodedFrame::solid(4, 2, [255, 0, 0, 255], 0));
        let pixels = frame.pixels().unwrap();

        assert_eq!(pixels.len(), DecodedFrame::rgba_buffer_size(4, 2));
        assert_eq!(&pixels[..4], &[255, 0, 0, 255]);
        assert_eq!(frame.aspect_ratio(), Some(2.0));
    }

    #[test]
    fn test_truncated_frame_hides_pixels() {
        let frame = DecodedFrame::new(Bytes::from_static(&[0, 0, 0]), 2, 2, 0);
        assert!(!frame.is_valid());
        assert!(frame.pixels().is_none());
    }
}
