//! Step-control flags and spindle-stop-override bookkeeping.

use bitflags::bitflags;

bitflags! {
    /// Flags the dispatcher raises for the stepper/planner to act on before
    /// the next segment is generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StepControlFlags: u8 {
        /// A feed-hold deceleration is in progress; the segment generator
        /// must not start a new block.
        const EXECUTE_HOLD        = 0x01;
        /// A system motion (parking retract/restore) is in progress and
        /// must run to completion before ordinary cycle motion resumes.
        const EXECUTE_SYS_MOTION  = 0x02;
        /// The spindle RPM set by the restore protocol needs to be pushed to
        /// the HAL before the next segment.
        const UPDATE_SPINDLE_RPM  = 0x04;
    }
}

/// Tracks a spindle-stop override requested mid-hold.
///
/// `initiate` is latched when the operator requests the override during a
/// hold; `enabled` once the spindle has actually been commanded to stop;
/// `restore`/`restore_cycle` distinguish "resume into Idle" from "resume the
/// interrupted cycle" when the override is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpindleStopOverride {
    pub initiate: bool,
    pub enabled: bool,
    pub restore: bool,
    pub restore_cycle: bool,
}

impl SpindleStopOverride {
    /// `true` if any of the four bits are set.
    pub fn is_active(&self) -> bool {
        self.initiate || self.enabled || self.restore || self.restore_cycle
    }

    /// Clear all bits, as done on cycle start and on leaving a hold.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
