use crate::dispatcher::{Env, Supervisor};
use crate::handlers::ActiveHandler;
use cnc_supervisor_common::condition::{CoolantState, SpindleModal};
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::park::ParkPlanData;

/// `state_await_waypoint_retract`: installed once the slow pull-out leg
/// submitted by `state_await_hold` lands. The machine is clear of the work
/// now, so the spindle and coolant are de-energized here regardless of
/// whether a further fast leg to `PARKING_TARGET` is still needed — the
/// original rationale is that neither should stay live for however long the
/// final leg (or the door staying open) takes.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if !events.contains(RtExec::CYCLE_COMPLETE) {
        return None;
    }

    if sup.step_control().contains(StepControlFlags::EXECUTE_SYS_MOTION) {
        sup.step_control_mut().remove(StepControlFlags::EXECUTE_SYS_MOTION);
        env.stepper.parking_restore_buffer();
    }

    // Clear accessory state after the retract; this also undoes an aborted
    // restore motion's condition, since `restart_retract` can route back
    // through this same handler.
    {
        let park = sup.park_mut();
        park.plan_data.coolant = CoolantState::empty();
        park.plan_data.spindle = SpindleModal::Off;
        park.plan_data.spindle_rpm = 0.0;
    }
    env.spindle.stop();
    env.coolant.set_state(CoolantState::empty());

    sup.install(ActiveHandler::AwaitResume);

    let cfg = sup.config().parking;
    let axis = cfg.axis.min(cnc_supervisor_common::consts::MAX_AXES - 1);
    let park = sup.park_mut();

    if park.current_target[axis] < cfg.target {
        let mut target = park.current_target;
        target[axis] = cfg.target;
        let plan = ParkPlanData {
            target,
            feed_rate: cfg.rate,
            line_number: cfg.motion_line_number,
            ..park.plan_data
        };
        park.plan_data = plan;
        park.current_target = target;
        env.planner.plan_system_motion(plan);
        let dispatched = env.motion.execute_system_motion(&plan);
        sup.park_mut().retracting = dispatched;
        if dispatched {
            sup.step_control_mut().insert(StepControlFlags::EXECUTE_SYS_MOTION);
            None
        } else {
            Some(RtExec::CYCLE_COMPLETE)
        }
    } else {
        Some(RtExec::CYCLE_COMPLETE)
    }
}
