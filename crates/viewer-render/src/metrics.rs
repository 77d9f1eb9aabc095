//! Render metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};

use viewer_ipc::RenderMetrics;

/// Collects render counters from both loops.
#[derive(Default)]
pub struct MetricsCollector {
    frames_received: AtomicU64,
    frames_drawn: AtomicU64,
    frames_dropped: AtomicU64,
    frames_discarded: AtomicU64,
    idle_ticks: AtomicU64,
    sessions: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame pulled from the stream.
    pub fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame painted onto the surface.
    pub fn record_drawn(&self) {
        self.frames_drawn.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame replaced before it was painted.
    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame released during teardown.
    pub fn record_discarded(&self) {
        self.frames_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a refresh with nothing to paint.
    pub fn record_idle_tick(&self) {
        self.idle_ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session start.
    pub fn record_session(&self) {
        self.sessions.fetch_add(1, Ordering::Relaxed);
    }

    /// Frames painted so far.
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn.load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> RenderMetrics {
        RenderMetrics {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_drawn: self.frames_drawn.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            frames_discarded: self.frames_discarded.load(Ordering::Relaxed),
            idle_ticks: self.idle_ticks.load(Ordering::Relaxed),
            sessions: self.sessions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = MetricsCollector::new();
        metrics.record_session();
        metrics.record_received();
        metrics.record_received();
        metrics.record_dropped();
        metrics.record_drawn();
        metrics.record_idle_tick();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sessions, 1);
        assert_eq!(snapshot.frames_received, 2);
        assert_eq!(snapshot.frames_dropped, 1);
        assert_eq!(snapshot.frames_drawn, 1);
        assert_eq!(snapshot.idle_ticks, 1);
        assert_eq!(snapshot.frames_discarded, 0);
        assert_eq!(metrics.frames_drawn(), 1);
    }
}
