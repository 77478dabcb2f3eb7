use crate::dispatcher::{Env, Supervisor};
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::state::SupervisorState;

/// `state_await_resumed`: installed once `state_restore` submits the plunge
/// leg. A door reopening here re-enters the retract step exactly like
/// `state_restore`'s own `SAFETY_DOOR` branch; landing cleanly restarts the
/// cycle.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if events.contains(RtExec::SAFETY_DOOR) {
        return super::restore_state::restart_retract(sup, env);
    }
    if !events.contains(RtExec::CYCLE_COMPLETE) {
        return None;
    }

    if sup.step_control().contains(StepControlFlags::EXECUTE_SYS_MOTION) {
        sup.step_control_mut().remove(StepControlFlags::EXECUTE_SYS_MOTION);
        env.stepper.parking_restore_buffer();
    }
    sup.set_parking(None);

    sup.set_state(SupervisorState::Idle, env);
    sup.set_state(SupervisorState::Cycle, env)
}
