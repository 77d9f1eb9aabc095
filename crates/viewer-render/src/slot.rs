//! Single-frame mailbox between the read loop and the paint loop.

use parking_lot::Mutex;
use viewer_frame::Frame;

/// Result of handing a frame to the slot.
///
/// Frames returned here are owned by the caller, who must release them.
#[derive(Debug)]
pub enum Deposit {
    /// The slot was empty.
    Stored,

    /// The slot held an unpainted frame, which is handed back.
    Replaced(Frame),

    /// The slot is closed or belongs to another session.
    Rejected(Frame),
}

#[derive(Default)]
struct SlotState {
    generation: u64,
    open: bool,
    frame: Option<Frame>,
}

/// Holds at most one pending frame for a single session.
///
/// Every transition happens under one lock, so a frame is either in the slot
/// or owned by exactly one caller.
#[derive(Default)]
pub struct RenderSlot {
    state: Mutex<SlotState>,
}

impl RenderSlot {
    /// Create a closed, empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the slot for a session, returning any leftover frame.
    pub fn open(&self, generation: u64) -> Option<Frame> {
        let mut state = self.state.lock();
        state.generation = generation;
        state.open = true;
        state.frame.take()
    }

    /// Close the slot, returning the buffered frame if any.
    pub fn close(&self) -> Option<Frame> {
        let mut state = self.state.lock();
        state.open = false;
        state.frame.take()
    }

    /// Store a frame for `generation`, keeping only the newest.
    pub fn deposit(&self, generation: u64, frame: Frame) -> Deposit {
        let mut state = self.state.lock();
        if !state.open || state.generation != generation {
            return Deposit::Rejected(frame);
        }

        match state.frame.replace(frame) {
            Some(previous) => Deposit::Replaced(previous),
            None => Deposit::Stored,
        }
    }

    /// Check out the buffered frame for `generation`, emptying the slot.
    pub fn take(&self, generation: u64) -> Option<Frame> {
        let mut state = self.state.lock();
        if !state.open || state.generation != generation {
            return None;
        }
        state.frame.take()
    }

    /// Returns true if no frame is buffered.
    pub fn is_empty(&self) -> bool {
        self.state.lock().frame.is_none()
    }

    /// Returns true while a session owns the slot.
    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Journal;

    #[test]
    fn test_deposit_keeps_newest() {
        let journal = Journal::new();
        let slot = RenderSlot::new();
        slot.open(1);

        assert!(matches!(slot.deposit(1, journal.frame(1)), Deposit::Stored));
        match slot.deposit(1, journal.frame(2)) {
            Deposit::Replaced(old) => {
                assert_eq!(old.timestamp_us(), 1);
                old.release();
            }
            other => panic!("unexpected deposit result: {other:?}"),
        }

        let frame = slot.take(1).unwrap();
        assert_eq!(frame.timestamp_us(), 2);
        assert!(slot.is_empty());
        frame.release();

        assert_eq!(journal.close_count(1), 1);
        assert_eq!(journal.close_count(2), 1);
    }

    #[test]
    fn test_closed_slot_rejects() {
        let journal = Journal::new();
        let slot = RenderSlot::new();

        assert!(matches!(slot.deposit(1, journal.frame(1)), Deposit::Rejected(_)));
        assert_eq!(journal.close_count(1), 1);
        assert!(!slot.is_open());
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let journal = Journal::new();
        let slot = RenderSlot::new();
        slot.open(2);

        assert!(matches!(slot.deposit(1, journal.frame(1)), Deposit::Rejected(_)));
        assert!(matches!(slot.deposit(2, journal.frame(2)), Deposit::Stored));
        assert!(slot.take(1).is_none());
        assert!(!slot.is_empty());
    }

    #[test]
    fn test_close_hands_back_pending_frame() {
        let journal = Journal::new();
        let slot = RenderSlot::new();
        slot.open(1);
        slot.deposit(1, journal.frame(7));

        let frame = slot.close().unwrap();
        assert_eq!(frame.timestamp_us(), 7);
        assert!(slot.take(1).is_none());
        assert!(slot.close().is_none());
    }
}
