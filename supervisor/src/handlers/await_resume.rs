use crate::dispatcher::{Env, Supervisor};
use crate::handlers::ActiveHandler;
use cnc_supervisor_common::collaborators::FeedbackMessage;
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::park::ParkPlanData;
use cnc_supervisor_common::state::{ParkingState, SupervisorState};

/// `state_await_resume`: two independent triggers.
///
/// `CYCLE_COMPLETE` (parking only) converts a just-landed retract into the
/// steady "parked, waiting for the door to close" state. `CYCLE_START` is
/// the operator's (or door-close-driven) request to resume; it is refused
/// outright while `SafetyDoor` still reads ajar, and otherwise branches on
/// which suspending state is being left.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if events.contains(RtExec::CYCLE_COMPLETE) && sup.config().parking.enabled {
        if sup.step_control().contains(StepControlFlags::EXECUTE_SYS_MOTION) {
            sup.step_control_mut().remove(StepControlFlags::EXECUTE_SYS_MOTION);
            env.stepper.parking_restore_buffer();
        }
        sup.set_parking(Some(ParkingState::DoorAjar));
    }

    if !events.contains(RtExec::CYCLE_START) {
        return None;
    }
    if sup.state() == SupervisorState::SafetyDoor && env.hal.door_ajar() {
        return None;
    }

    if sup.state() == SupervisorState::Hold && !sup.spindle_stop_override().is_active() {
        sup.spindle_stop_ovr_mut().restore_cycle = true;
    }

    // `handler_changed` tracks whether a sub-branch already installed a new
    // handler and a resume motion in flight: only the parking-retracted leg
    // of the door/sleep branch does. Every other branch (tool change,
    // non-parking door/sleep, and plain hold) falls straight through to
    // restarting the cycle below.
    let mut handler_changed = false;
    let mut result = None;

    match sup.state() {
        SupervisorState::ToolChange => {}
        SupervisorState::Sleep | SupervisorState::SafetyDoor => {
            if sup.config().parking.enabled {
                sup.park_mut().restart_retract = false;
                sup.set_parking(Some(ParkingState::Resuming));
                if sup.park_mut().retracting {
                    handler_changed = true;
                    sup.install(ActiveHandler::RestoreState);
                    result = begin_resume_retract(sup, env);
                }
            } else {
                crate::restore::restore_conditions(sup, env);
            }
        }
        _ => apply_spindle_restore(sup, env),
    }

    if handler_changed {
        result
    } else {
        sup.set_state(SupervisorState::Idle, env);
        sup.set_state(SupervisorState::Cycle, env)
    }
}

/// Submits the fast waypoint-bound restore leg (or skips straight to
/// `state_restore`'s `CYCLE_COMPLETE` handling if no retract ever ran).
fn begin_resume_retract(sup: &mut Supervisor, env: &mut Env) -> Option<RtExec> {
    let cfg = sup.config().parking;
    let axis = cfg.axis.min(cnc_supervisor_common::consts::MAX_AXES - 1);
    let park = sup.park_mut();

    if park.current_target[axis] <= cfg.target {
        let mut target = park.current_target;
        target[axis] = park.retract_waypoint[axis];
        let plan = ParkPlanData {
            target,
            feed_rate: cfg.rate,
            line_number: cfg.motion_line_number,
            ..ParkPlanData::default()
        };
        park.plan_data = plan;
        park.current_target = target;
        env.planner.plan_system_motion(plan);
        let dispatched = env.motion.execute_system_motion(&plan);
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

/// Plain-`Hold` resume: restore the spindle to its pre-hold modal state if
/// the operator had overridden it off, or apply a deferred RPM update from
/// an override that changed speed mid-hold.
fn apply_spindle_restore(sup: &mut Supervisor, env: &mut Env) {
    let ovr = sup.spindle_stop_override();
    if ovr.is_active() {
        if ovr.restore || ovr.restore_cycle {
            if env.gcode.modal_spindle().is_on() {
                env.report.feedback_message(FeedbackMessage::SpindleRestore);
                if sup.config().machine.laser_mode {
                    sup.step_control_mut().insert(StepControlFlags::UPDATE_SPINDLE_RPM);
                } else {
                    let condition = sup.condition();
                    env.spindle.set_state(condition.spindle_modal, condition.spindle_rpm);
                }
            }
            if ovr.enabled {
                env.report.feedback_message(FeedbackMessage::SpindleStopOverrideRestored);
            }
            sup.spindle_stop_ovr_mut().clear();
        }
    } else if sup.step_control().contains(StepControlFlags::UPDATE_SPINDLE_RPM) {
        let condition = sup.condition();
        env.spindle.set_state(condition.spindle_modal, condition.spindle_rpm);
        sup.step_control_mut().remove(StepControlFlags::UPDATE_SPINDLE_RPM);
    }
}
