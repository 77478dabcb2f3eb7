use crate::dispatcher::{Env, Supervisor};
use crate::handlers::ActiveHandler;
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::state::SupervisorState;

/// `state_cycle`: installed for both `Cycle` and `Jog` — jog reuses the
/// cycle handler. `FEED_HOLD` routes through `set_state(Hold)`
/// unconditionally; the Transition Engine itself refuses the transition
/// while jogging, so a plain jog can only be cancelled via `MOTION_CANCEL`,
/// never interrupted by a feed-hold.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if events.contains(RtExec::CYCLE_COMPLETE) {
        *sup.step_control_mut() = StepControlFlags::empty();
        return sup.set_state(SupervisorState::Idle, env);
    }

    // MOTION_CANCEL isn't gated on `Jog` specifically — this handler is
    // shared with ordinary `Cycle` motion, and the same recompute-and-
    // suspend applies regardless of which one is running;
    // `state_await_motion_cancel` is what tells the two apart on completion.
    if events.contains(RtExec::MOTION_CANCEL) {
        env.planner.recompute_deceleration();
        sup.set_suspend(true);
        sup.step_control_mut().insert(StepControlFlags::EXECUTE_HOLD);
        sup.install(ActiveHandler::AwaitMotionCancel);
        return None;
    }

    if events.contains(RtExec::FEED_HOLD) {
        return sup.set_state(SupervisorState::Hold, env);
    }

    None
}
