//! Trait seams to the capabilities the supervisor consumes but does not own.
//! Each external subsystem — planner, stepper, spindle, coolant, parser,
//! HAL, status reporting, accessory overrides, parking motion, and the
//! suspension-aware delay — is a trait here and a mock implementation in
//! `cnc-supervisor-sim`.

use crate::condition::{CoolantState, SpindleModal};
use crate::park::ParkPlanData;

/// Whether the motion system currently has anything queued or in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCondition {
    /// No blocks queued; motion is at rest.
    Idle,
    /// A block is executing or queued.
    Active,
}

/// The spindle/coolant condition and feed rate carried by the planner's
/// current block, read when a hold begins with motion in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSpindleState {
    pub modal: SpindleModal,
    pub rpm: f64,
    /// `true` if the block requires the spindle to be phase-locked before
    /// its first step (e.g. threading).
    pub spindle_synchronized: bool,
}

/// The motion planner: what's queued, and how to discard/inject motions.
pub trait Planner {
    /// Current queue occupancy, used both to decide whether entering a
    /// cycle is legal and whether a `CYCLE_COMPLETE` must be synthesized
    /// for a zero-length parking motion.
    fn block_condition(&self) -> BlockCondition;

    /// The current block's own spindle/coolant condition and feed,
    /// `None` if there is no current block.
    fn current_block_spindle(&self) -> Option<BlockSpindleState>;

    /// Full planner reset after a jog/motion cancel.
    fn reset(&mut self);

    /// Re-synchronize the planner's notion of current position to the
    /// machine position after a cancel.
    fn sync_position(&mut self);

    /// Recompute the deceleration profile for the block currently in
    /// flight so it comes to a controlled stop.
    fn recompute_deceleration(&mut self);

    /// Re-initialize the current block so it can be resumed later without
    /// re-planning from scratch.
    fn cycle_reinitialize(&mut self);

    /// Queue a parking system motion (retract or restore) ahead of ordinary
    /// program motion.
    fn plan_system_motion(&mut self, plan: ParkPlanData);
}

/// The stepper/segment generator.
pub trait Stepper {
    /// Stop segment generation immediately (feed hold/motion-cancel
    /// engaged).
    fn request_stop(&mut self);

    /// `true` once the stepper has actually come to rest after a
    /// `request_stop` (the motion may still be decelerating).
    fn is_stopped(&self) -> bool;

    /// Prefill the step segment buffer for a fresh cycle entry.
    fn prep_buffer(&mut self);

    /// Kick the stepper ISR into motion after a cycle/jog/resume.
    fn wake_up(&mut self);

    /// Full stepper reset after a jog/motion cancel.
    fn reset(&mut self);

    /// Swap the segment buffer back to ordinary-motion mode after a parking
    /// system motion completes.
    fn parking_restore_buffer(&mut self);
}

/// The spindle driver.
pub trait Spindle {
    fn set_state(&mut self, modal: SpindleModal, rpm: f64);
    fn stop(&mut self);
    fn current_rpm(&self) -> f64;
    /// `true` once the spindle has reached the commanded RPM, for HAL
    /// implementations that expose real feedback; HALs without feedback
    /// always return `true` and let the fixed delay in
    /// [`crate::config::DoorDelayConfig`] stand in.
    fn at_speed(&self, target_rpm: f64) -> bool;
    /// Reset the spindle index-pulse counter ahead of a spindle-synchronized
    /// cycle entry.
    fn reset_sync_counter(&mut self);
    /// Index-pulse edges observed since the last [`Spindle::reset_sync_counter`]
    /// call, polled by the spindle-synchronized busy-wait until it has
    /// advanced by at least two edges.
    fn sync_edge_count(&self) -> u32;
}

/// The coolant driver.
pub trait Coolant {
    fn set_state(&mut self, state: CoolantState);
    fn current_state(&self) -> CoolantState;
}

/// The g-code parser/executor, resumed once conditions are restored.
pub trait Gcode {
    /// The modal spindle/coolant state the parser currently holds, read
    /// when a hold begins with no block in flight.
    fn modal_spindle(&self) -> SpindleModal;
    fn modal_coolant(&self) -> CoolantState;

    /// Re-synchronize the parser's notion of current position to the
    /// machine position after a cancel.
    fn sync_position(&mut self);
}

/// Hardware-abstraction-layer hooks that don't belong to any one
/// subsystem above.
pub trait Hal {
    /// Current machine position, one entry per configured axis.
    fn position(&self) -> [f64; crate::consts::MAX_AXES];

    /// Level-sensed door state, polled while parked/waiting to resume.
    /// Distinct from the edge-triggered [`crate::events::RtExec::SAFETY_DOOR`]
    /// bit, which only signals the ajar transition and is consumed once.
    fn door_ajar(&self) -> bool;

    /// `true` if the spindle driver reports a real at-speed feedback
    /// capability; otherwise the Condition Restorer falls back to a fixed
    /// delay.
    fn spindle_at_speed_capable(&self) -> bool;
}

/// Where status/feedback messages are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackMessage {
    SafetyDoorAjar,
    SafetyDoorClosed,
    SpindleRestore,
    SpindleStopOverrideActive,
    SpindleStopOverrideRestored,
    ParkingRetractStarted,
    ParkingRestoreStarted,
}

pub trait Report {
    fn feedback_message(&mut self, message: FeedbackMessage);
}

/// Manual overrides the operator may apply while held.
pub trait AccessoryOverrides {
    /// Enqueue an accessory override code, e.g. forcing the spindle off
    /// when laser mode requires it during a hold.
    fn enqueue_spindle_stop(&mut self);
}

/// Issues the parking retract/restore system motions themselves, as opposed
/// to [`Planner::plan_system_motion`] which only enqueues the plan.
pub trait Motion {
    /// Begin executing a previously-planned system motion. Returns `true`
    /// once it has actually been dispatched to the stepper, `false` if the
    /// plan describes a zero-length move.
    fn execute_system_motion(&mut self, plan: &ParkPlanData) -> bool;
}

/// A suspension-aware delay: sleeps up to `seconds`, but polls for early
/// wake conditions (e.g. the safety door reopening mid-restore) via the
/// supplied closure rather than blocking unconditionally.
///
/// The `poll` closure is evaluated by the delay's own implementation (a
/// fixed-step sleep loop in `cnc-supervisor-sim`, or the RT loop's own tick
/// in an embedded build) and must not call back into the dispatcher; it may
/// only observe shared state such as the pending event mailbox.
pub trait Delay {
    /// Returns `true` if `poll` returned `true` before `seconds` elapsed
    /// (an early wake occurred), `false` if the full delay ran out.
    fn delay_sec(&mut self, seconds: f64, poll: &mut dyn FnMut() -> bool) -> bool;
}
