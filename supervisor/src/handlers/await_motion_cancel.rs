use crate::dispatcher::{Env, Supervisor};
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::state::SupervisorState;

/// `state_await_motion_cancel`: installed on a jog cancel.
/// Waits for the stepper ISR's own `CYCLE_COMPLETE` report that motion has
/// actually come to rest (rather than polling `Stepper::is_stopped` every
/// tick), then fully resets the planner/stepper and re-synchronizes their
/// notion of position to the machine before dropping back to `Idle`.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if !events.contains(RtExec::CYCLE_COMPLETE) {
        return None;
    }

    // The full reset only applies to a jog cancel; an ordinary cycle motion
    // that happened to route through MOTION_CANCEL falls straight back to
    // `pending_state` (Idle) without disturbing planner/stepper state it
    // will need again on resume.
    if sup.state() == SupervisorState::Jog {
        *sup.step_control_mut() = cnc_supervisor_common::flags::StepControlFlags::empty();
        env.planner.reset();
        env.stepper.reset();
        env.gcode.sync_position();
        env.planner.sync_position();
    }

    let target = sup.pending_state_mut().take().unwrap_or(SupervisorState::Idle);
    sup.set_state(target, env)
}
