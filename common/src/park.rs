//! Parking retract/restore protocol state.

use crate::condition::{CoolantState, SpindleModal};
use crate::consts::MAX_AXES;

/// Per-axis target data for a single planned parking motion (retract,
/// waypoint-to-target, waypoint-to-restore, or plunge).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParkPlanData {
    pub target: [f64; MAX_AXES],
    pub feed_rate: f64,
    /// Pre-hold coolant/spindle condition carried along on the pull-out and
    /// plunge legs so the block the motion planner sees matches what was
    /// snapshotted at hold time; zeroed on the fast retract/restore legs
    /// once the machine is safely parked.
    pub coolant: CoolantState,
    pub spindle: SpindleModal,
    pub spindle_rpm: f64,
    /// `true` for the internally-generated system motions the parking
    /// protocol issues; distinguishes them from ordinary program motion so
    /// overrides and block-delete do not apply.
    pub system_motion: bool,
    /// Feed override must not apply to these motions.
    pub no_feed_override: bool,
    /// Parking motions are not attributable to a source line
    /// (`PARKING_MOTION_LINE_NUMBER`).
    pub line_number: u32,
}

impl Default for ParkPlanData {
    fn default() -> Self {
        Self {
            target: [0.0; MAX_AXES],
            feed_rate: 0.0,
            coolant: CoolantState::empty(),
            spindle: SpindleModal::Off,
            spindle_rpm: 0.0,
            system_motion: true,
            no_feed_override: true,
            line_number: 0,
        }
    }
}

/// State threaded through the safety-door/sleep parking sub-protocol.
/// Present unconditionally rather than behind a `#[cfg]` split: whether
/// parking is exercised at all is governed by
/// [`crate::config::ParkingConfig::enabled`] and feasibility at runtime,
/// not by a compile feature.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParkContext {
    /// Last known machine position, captured when the park protocol begins.
    pub current_target: [f64; MAX_AXES],
    /// Position to return to once the restore completes.
    pub restore_target: [f64; MAX_AXES],
    /// Pull-out intermediate position on the configured parking axis.
    pub retract_waypoint: [f64; MAX_AXES],
    /// Did a retract motion actually execute (as opposed to the machine
    /// already sitting past `PARKING_TARGET` when the park began)? Read back
    /// by `state_await_resume` to decide whether a waypoint-to-retract leg
    /// is needed on resume.
    pub retracting: bool,
    /// Set when a door reopens mid-restore; forces the restore to abandon
    /// whatever it was doing and re-enter at the retract step instead of
    /// continuing toward `restore_target`.
    pub restart_retract: bool,
    pub plan_data: ParkPlanData,
}

impl ParkContext {
    /// Reset per-hold bookkeeping when a new hold/door cycle begins. Leaves
    /// `restore_target`/`retract_waypoint` for the first retract to fill in,
    /// guarded by `restart_retract` so a door reopen mid-restore does not
    /// recompute them from the (already-displaced) current position.
    pub fn reset_for_hold(&mut self) {
        self.restart_retract = false;
        self.retracting = false;
    }

    /// Refresh `current_target` from the actual machine position.
    /// Unconditional, unlike [`Self::begin_retract_waypoint`]: this runs on
    /// every entry into the parking branch of `state_await_hold`, including
    /// a `restart_retract` re-entry, so the feasibility checks downstream
    /// always compare against where the machine really is rather than a
    /// stale software waypoint.
    pub fn refresh_current_position(&mut self, current_position: &[f64; MAX_AXES]) {
        self.current_target = *current_position;
    }

    /// Record `restore_target`/`retract_waypoint` from the position
    /// observed the first time parking begins: the waypoint starts from
    /// that position and only the parking axis component is overwritten
    /// with the increment-offset retract distance, clamped to the final
    /// parking target. The increment is added to the axis position, not
    /// substituted for it. Guarded by the caller to run only when
    /// `!restart_retract`, so a door reopen mid-restore does not recompute
    /// these from the already-displaced position.
    pub fn begin_retract_waypoint(&mut self, current_position: &[f64; MAX_AXES], parking_axis: usize, pullout_increment: f64, target: f64) {
        self.restore_target = *current_position;
        self.retract_waypoint = *current_position;
        if parking_axis < MAX_AXES {
            let pulled_out = current_position[parking_axis] + pullout_increment;
            self.retract_waypoint[parking_axis] = pulled_out.min(target);
        }
    }
}
