use crate::dispatcher::{Env, Supervisor};
use crate::handlers::ActiveHandler;
use cnc_supervisor_common::collaborators::FeedbackMessage;
use cnc_supervisor_common::condition::CoolantState;
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::park::ParkPlanData;
use cnc_supervisor_common::state::{HoldingState, ParkingState, SupervisorState};

/// `state_await_hold`: shared by `Hold`, `SafetyDoor`, `Sleep`, and
/// `ToolChange`. Waits for the stepper ISR's `CYCLE_COMPLETE` report that
/// the deceleration requested by the Hold Initiator has actually brought
/// motion to rest, then branches on which of the four suspending states is
/// active before falling to `state_await_resume` once no
/// sub-handler took over.
pub(crate) fn run(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    if !events.contains(RtExec::CYCLE_COMPLETE) {
        return None;
    }
    env.planner.cycle_reinitialize();
    *sup.step_control_mut() = StepControlFlags::empty();

    let synthesized = match sup.state() {
        SupervisorState::ToolChange => {
            env.spindle.stop();
            env.coolant.set_state(CoolantState::empty());
            None
        }
        SupervisorState::Sleep | SupervisorState::SafetyDoor => {
            // Ensure any prior spindle-stop override is disabled at the
            // start of the safety-door routine.
            sup.spindle_stop_ovr_mut().clear();

            if parking_feasible(sup, env) {
                Some(begin_parking_retract(sup, env))
            } else {
                env.spindle.stop();
                env.coolant.set_state(CoolantState::empty());
                sup.set_parking(Some(ParkingState::DoorAjar));
                None
            }
        }
        _ => {
            // default (Hold): spindle-stop-override bookkeeping only.
            if sup.spindle_stop_override().initiate {
                sup.spindle_stop_ovr_mut().clear();
                if env.gcode.modal_spindle().is_on() {
                    env.spindle.stop();
                    sup.spindle_stop_ovr_mut().enabled = true;
                    env.report.feedback_message(FeedbackMessage::SpindleStopOverrideActive);
                }
            }
            None
        }
    };

    match synthesized {
        Some(pending) => pending,
        None => {
            sup.set_holding(HoldingState::Complete);
            sup.install(ActiveHandler::AwaitResume);
            None
        }
    }
}

/// Parking is only attempted when homed, laser mode is off, the operator
/// hasn't disabled it, and the machine hasn't already drifted past the
/// parking target on its own.
fn parking_feasible(sup: &Supervisor, env: &Env) -> bool {
    let cfg = sup.config();
    if !cfg.parking.enabled || cfg.overrides.parking_disable || cfg.machine.laser_mode || !cfg.machine.homing_enable {
        return false;
    }
    let axis = cfg.parking.axis.min(cnc_supervisor_common::consts::MAX_AXES - 1);
    env.hal.position()[axis] < cfg.parking.target
}

/// Submits the slow pull-out leg and installs `state_await_waypoint_retract`
/// to drive it (and the following fast leg) to completion. Returns
/// `Some(CYCLE_COMPLETE)` when the pull-out is zero-length so the dispatcher
/// re-enters the freshly-installed handler with that synthesized tick
/// re-entry, `None` once a real motion has been dispatched.
fn begin_parking_retract(sup: &mut Supervisor, env: &mut Env) -> Option<RtExec> {
    let position = env.hal.position();
    let cfg = sup.config().parking;
    let axis = cfg.axis.min(cnc_supervisor_common::consts::MAX_AXES - 1);
    let snapshot = sup.condition();

    let park = sup.park_mut();
    park.refresh_current_position(&position);
    if !park.restart_retract {
        park.begin_retract_waypoint(&position, cfg.axis, cfg.pullout_increment, cfg.target);
    }
    sup.install(ActiveHandler::AwaitWaypointRetract);

    let park = sup.park_mut();
    if park.current_target[axis] < park.retract_waypoint[axis] {
        let target = park.retract_waypoint;
        let plan = ParkPlanData {
            target,
            feed_rate: cfg.pullout_rate,
            coolant: snapshot.coolant_modal,
            spindle: snapshot.spindle_modal,
            spindle_rpm: snapshot.spindle_rpm,
            line_number: cfg.motion_line_number,
            ..ParkPlanData::default()
        };
        park.plan_data = plan;
        park.current_target = target;
        env.planner.plan_system_motion(plan);
        let dispatched = env.motion.execute_system_motion(&plan);
        sup.park_mut().retracting = dispatched;
        if dispatched {
            sup.step_control_mut().insert(StepControlFlags::EXECUTE_SYS_MOTION);
            env.report.feedback_message(FeedbackMessage::ParkingRetractStarted);
            None
        } else {
            Some(RtExec::CYCLE_COMPLETE)
        }
    } else {
        Some(RtExec::CYCLE_COMPLETE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Supervisor;
    use crate::test_support::Fixture;
    use cnc_supervisor_common::config::SupervisorConfig;

    #[test]
    fn tool_change_always_de_energizes() {
        let mut fx = Fixture::new();
        fx.spindle.rpm = 500.0;
        fx.coolant.state = CoolantState::FLOOD;
        let mut sup = Supervisor::new(SupervisorConfig::default());
        sup.begin_tool_change(&mut fx.env());
        let mut env = fx.env();
        run(&mut sup, RtExec::CYCLE_COMPLETE, &mut env);
        assert_eq!(env.coolant.current_state(), CoolantState::empty());
    }

    #[test]
    fn parking_infeasible_when_laser_mode_on() {
        let mut fx = Fixture::new();
        let mut cfg = SupervisorConfig::default();
        cfg.machine.laser_mode = true;
        let sup = Supervisor::new(cfg);
        let env = fx.env();
        assert!(!parking_feasible(&sup, &env));
    }

    #[test]
    fn parking_infeasible_past_target() {
        let mut fx = Fixture::new();
        fx.hal.position[2] = 10.0;
        let mut cfg = SupervisorConfig::default();
        cfg.parking.target = 0.0;
        cfg.parking.axis = 2;
        let sup = Supervisor::new(cfg);
        let env = fx.env();
        assert!(!parking_feasible(&sup, &env));
    }
}
