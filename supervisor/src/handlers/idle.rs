use crate::dispatcher::{Env, Supervisor};
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::state::SupervisorState;

/// `state_idle`: promotes to `Cycle` on a cycle-start only if the planner
/// actually has motion queued. This is also where a machine falling back
/// from a hold (`pending_state == Some(Idle)`) naturally re-discovers an
/// interrupted cycle's remaining blocks once the operator (or the
/// door-close restore) sends the next cycle-start. A feed-hold while idle
/// still runs the Hold Initiator, since the machine may have a spindle or
/// coolant state worth snapshotting even with no motion queued.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if events.contains(RtExec::CYCLE_START) {
        return sup.set_state(SupervisorState::Cycle, env);
    }
    if events.contains(RtExec::FEED_HOLD) {
        return sup.set_state(SupervisorState::Hold, env);
    }
    None
}
