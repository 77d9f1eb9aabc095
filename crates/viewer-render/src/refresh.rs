//! Display refresh (vsync) signalling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Source of display refresh ticks.
///
/// Ticks are coalesced: a listener that falls behind sees one refresh, not a
/// burst of them.
pub struct DisplayRefresh {
    sender: watch::Sender<u64>,
}

/// Listener half of a [`DisplayRefresh`].
#[derive(Clone)]
pub struct RefreshSignal {
    receiver: watch::Receiver<u64>,
}

impl DisplayRefresh {
    /// Create a refresh source with no ticks yet.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self { sender }
    }

    /// Signal one display refresh.
    pub fn signal(&self) {
        self.sender.send_modify(|tick| *tick = tick.wrapping_add(1));
    }

    /// Subscribe to future refreshes.
    pub fn subscribe(&self) -> RefreshSignal {
        RefreshSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of refreshes signalled so far.
    pub fn ticks(&self) -> u64 {
        *self.sender.borrow()
    }

    /// Signal refreshes from a timer at `refresh_rate_hz`.
    ///
    /// Must be called from within a tokio runtime; abort the handle to stop.
    pub fn spawn_interval(self: &Arc<Self>, refresh_rate_hz: u32) -> JoinHandle<()> {
        let refresh = Arc::clone(self);
        let period = Duration::from_secs_f64(1.0 / refresh_rate_hz.max(1) as f64);
        debug!(refresh_rate_hz, ?period, "Starting display refresh timer");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                refresh.signal();
            }
        })
    }
}

impl Default for DisplayRefresh {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    /// Wait for the next refresh. Returns false once the source is gone.
    pub async fn next(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Forget refreshes that happened before now.
    pub fn mark_seen(&mut self) {
        self.receiver.borrow_and_update();
    }
}
