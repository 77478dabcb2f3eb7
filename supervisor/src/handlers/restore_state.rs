use crate::dispatcher::{Env, Supervisor};
use crate::handlers::ActiveHandler;
use cnc_supervisor_common::collaborators::FeedbackMessage;
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::park::ParkPlanData;
use cnc_supervisor_common::state::ParkingState;

/// `state_restore`: installed once `state_await_resume` has submitted (or
/// synthesized the completion of) the fast leg back to `retract_waypoint`.
/// A door reopening here discards the restore outright; landing cleanly
/// instead runs the Condition Restorer and submits the slow plunge leg back
/// to the exact pre-hold position, with the snapshotted spindle/coolant
/// state folded into the plan block.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if events.contains(RtExec::SAFETY_DOOR) {
        return restart_retract(sup, env);
    }
    if !events.contains(RtExec::CYCLE_COMPLETE) {
        return None;
    }

    if sup.step_control().contains(StepControlFlags::EXECUTE_SYS_MOTION) {
        sup.step_control_mut().remove(StepControlFlags::EXECUTE_SYS_MOTION);
    }
    sup.install(ActiveHandler::AwaitResumed);

    if !crate::restore::restore_conditions(sup, env) {
        // `restore_conditions` already latched `restart_retract` on a door
        // reopening mid-wait; nothing further to submit this tick.
        return None;
    }

    let condition = sup.condition();
    let cfg = sup.config().parking;
    let park = sup.park_mut();
    let plan = ParkPlanData {
        target: park.restore_target,
        feed_rate: cfg.pullout_rate,
        coolant: condition.coolant_modal,
        spindle: condition.spindle_modal,
        spindle_rpm: condition.spindle_rpm,
        line_number: cfg.motion_line_number,
        ..ParkPlanData::default()
    };
    park.plan_data = plan;
    env.planner.plan_system_motion(plan);
    let dispatched = env.motion.execute_system_motion(&plan);
    if dispatched {
        sup.step_control_mut().insert(StepControlFlags::EXECUTE_SYS_MOTION);
        env.report.feedback_message(FeedbackMessage::ParkingRestoreStarted);
        None
    } else {
        Some(RtExec::CYCLE_COMPLETE)
    }
}

/// Shared by `state_restore` and `state_await_resumed`: a door reopening at
/// any point during the restore discards whatever leg was in flight and
/// forces re-entry at the retract step.
pub(crate) fn restart_retract(sup: &mut Supervisor, env: &mut Env) -> Option<RtExec> {
    env.report.feedback_message(FeedbackMessage::SafetyDoorAjar);
    sup.install(ActiveHandler::AwaitHold);
    sup.park_mut().restart_retract = true;
    sup.set_parking(Some(ParkingState::Retracting));

    if sup.step_control().contains(StepControlFlags::EXECUTE_SYS_MOTION) {
        env.planner.recompute_deceleration();
        sup.step_control_mut().insert(StepControlFlags::EXECUTE_HOLD);
        None
    } else {
        Some(RtExec::CYCLE_COMPLETE)
    }
}
