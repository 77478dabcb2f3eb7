//! Realtime-event bitmask.
//!
//! ISRs and button/door debounce logic (out of scope here) post bits with a
//! bitwise OR; the main loop samples with a read-and-clear so no event is
//! lost between ticks. A `bitflags!` type rather than a hand-rolled mask.

use bitflags::bitflags;
use std::sync::atomic::{AtomicU16, Ordering};

bitflags! {
    /// Pending realtime events sampled by the dispatcher each tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RtExec: u16 {
        /// Operator pressed cycle-start.
        const CYCLE_START    = 0x0001;
        /// Operator pressed feed-hold.
        const FEED_HOLD      = 0x0002;
        /// Stepper ISR reports the active block/segment has finished.
        const CYCLE_COMPLETE = 0x0004;
        /// Jog cancel / motion-cancel requested.
        const MOTION_CANCEL  = 0x0008;
        /// Safety door sensor transitioned to ajar.
        const SAFETY_DOOR    = 0x0010;
        /// Soft reset requested. Surfaced here for completeness; consumed by
        /// the reset handling that owns transitions out of `Alarm`/`EStop`
        /// (out of scope here), not by any state handler.
        const RESET          = 0x0020;
        /// A hardware or software alarm condition was latched.
        const ALARM          = 0x0040;
    }
}

/// Lock-free mailbox for [`RtExec`] bits, written by ISRs and drained by the
/// main loop. OR-post from any context; read-and-clear from the single
/// dispatcher owner — no locks required.
#[derive(Debug, Default)]
pub struct EventMailbox(AtomicU16);

impl EventMailbox {
    /// Create an empty mailbox.
    pub const fn new() -> Self {
        Self(AtomicU16::new(0))
    }

    /// Post bits into the mailbox (ISR side). Never lost: OR'd in place.
    #[inline]
    pub fn post(&self, bits: RtExec) {
        self.0.fetch_or(bits.bits(), Ordering::Release);
    }

    /// Read the pending bits without clearing them. Used by the
    /// suspension-aware delay loop to detect a door reopening without
    /// consuming the event the dispatcher still needs to see.
    #[inline]
    pub fn peek(&self) -> RtExec {
        RtExec::from_bits_truncate(self.0.load(Ordering::Acquire))
    }

    /// Atomically read and clear all pending bits (main-loop side).
    #[inline]
    pub fn take(&self) -> RtExec {
        RtExec::from_bits_truncate(self.0.swap(0, Ordering::AcqRel))
    }
}
