//! End-to-end scenarios against a real `Supervisor` driven by the crate's
//! mocks, covering six concrete operator scenarios and the invariants that
//! accompany them.

use cnc_supervisor_common::collaborators::{BlockCondition, FeedbackMessage};
use cnc_supervisor_common::condition::{CoolantState, SpindleModal};
use cnc_supervisor_common::config::SupervisorConfig;
use cnc_supervisor_common::events::{EventMailbox, RtExec};
use cnc_supervisor_common::state::{HoldingState, ParkingState, SupervisorState};
use cnc_supervisor_core::{Env, Supervisor};
use cnc_supervisor_sim::mocks::*;

struct Harness {
    supervisor: Supervisor,
    mailbox: EventMailbox,
    planner: SimPlanner,
    stepper: SimStepper,
    spindle: SimSpindle,
    coolant: SimCoolant,
    gcode: SimGcode,
    hal: SimHal,
    report: SimReport,
    overrides: SimOverrides,
    motion: SimMotion,
    delay: SimDelay,
}

impl Harness {
    fn new() -> Self {
        Self {
            supervisor: Supervisor::new(SupervisorConfig::default()),
            mailbox: EventMailbox::new(),
            planner: SimPlanner {
                condition: BlockCondition::Active,
                ..Default::default()
            },
            stepper: SimStepper { stopped: true, ..Default::default() },
            spindle: SimSpindle {
                reaches_speed: true,
                ..Default::default()
            },
            coolant: SimCoolant::default(),
            gcode: SimGcode::default(),
            hal: SimHal::default(),
            report: SimReport::default(),
            overrides: SimOverrides::default(),
            motion: SimMotion::default(),
            delay: SimDelay::default(),
        }
    }

    fn tick(&mut self, post: RtExec) -> SupervisorState {
        self.mailbox.post(post);
        let events = self.mailbox.take();
        let mut env = Env {
            planner: &mut self.planner,
            stepper: &mut self.stepper,
            spindle: &mut self.spindle,
            coolant: &mut self.coolant,
            gcode: &mut self.gcode,
            hal: &mut self.hal,
            report: &mut self.report,
            overrides: &mut self.overrides,
            motion: &mut self.motion,
            delay: &mut self.delay,
            events: &self.mailbox,
        };
        self.supervisor.update(events, &mut env)
    }
}

// Scenario 1: plain feed-hold during a cycle, resumed with no
// override and nothing to restore.
#[test]
fn scenario_1_plain_feed_hold_during_cycle() {
    let mut h = Harness::new();
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::Cycle);

    h.stepper.stopped = false;
    assert_eq!(h.tick(RtExec::FEED_HOLD), SupervisorState::Hold);
    assert_eq!(h.supervisor.holding_state(), HoldingState::Pending);
    assert!(h.supervisor.step_control().contains(
        cnc_supervisor_common::flags::StepControlFlags::EXECUTE_HOLD
    ));

    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Hold);
    assert_eq!(h.supervisor.holding_state(), HoldingState::Complete);

    // Nothing was overridden mid-hold: resume falls straight through to
    // Idle -> Cycle, `suspend` clears.
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::Cycle);
    assert!(!h.supervisor.suspend());
}

// Scenario 2: jog then motion-cancel tears planner/stepper
// state down and returns to Idle with all step-control flags clear.
#[test]
fn scenario_2_jog_then_motion_cancel() {
    let mut h = Harness::new();
    h.supervisor.begin_jog();
    assert_eq!(h.supervisor.state(), SupervisorState::Jog);

    h.stepper.stopped = false;
    h.tick(RtExec::MOTION_CANCEL);
    assert_eq!(h.supervisor.state(), SupervisorState::Jog);
    assert!(h.supervisor.suspend());

    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Idle);
    assert_eq!(h.planner.reset_count, 1);
    assert_eq!(h.stepper.reset_count, 1);
    assert_eq!(h.gcode.position_synced, 1);
    assert!(h.supervisor.step_control().is_empty());
    assert!(!h.supervisor.suspend());
}

// Scenario 3: door opened mid-cycle with parking disabled
// degrades straight to "stop spindle + kill coolant + DoorAjar".
#[test]
fn scenario_3_door_mid_cycle_parking_disabled() {
    let mut h = Harness::new();
    let mut cfg = SupervisorConfig::default();
    cfg.parking.enabled = false;
    h.supervisor = Supervisor::new(cfg);

    h.tick(RtExec::CYCLE_START);
    // No current block is in flight on this mock, so the Hold Initiator's
    // snapshot is taken from the parser's modal state, not the spindle/
    // coolant mocks directly.
    h.gcode.modal_spindle = SpindleModal::Cw;
    h.gcode.modal_coolant = CoolantState::FLOOD;
    h.spindle.set_state(SpindleModal::Cw, 9_000.0);
    h.coolant.set_state(CoolantState::FLOOD);
    h.stepper.stopped = false;

    assert_eq!(h.tick(RtExec::SAFETY_DOOR), SupervisorState::SafetyDoor);
    assert!(h.report.messages.contains(&FeedbackMessage::SafetyDoorAjar));

    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::SafetyDoor);
    assert_eq!(h.spindle.current_rpm(), 0.0);
    assert_eq!(h.coolant.current_state(), CoolantState::empty());
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::DoorAjar));

    // Door still ajar: cycle-start is refused.
    h.hal.door_ajar = true;
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::SafetyDoor);

    // Door closes: spindle/coolant restore with delays, then Idle -> Cycle.
    h.hal.door_ajar = false;
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::Cycle);
    assert_eq!(h.spindle.current_rpm(), 9_000.0);
    assert_eq!(h.coolant.current_state(), CoolantState::FLOOD);
    assert!(!h.supervisor.suspend());
}

// Scenario 4: door opened mid-cycle, parking enabled and
// feasible, drives the full retract -> park -> restore -> plunge -> cycle
// sequence.
#[test]
fn scenario_4_door_mid_cycle_parking_feasible() {
    let mut h = Harness::new();
    h.tick(RtExec::CYCLE_START);
    h.gcode.modal_spindle = SpindleModal::Cw;
    h.gcode.modal_coolant = CoolantState::FLOOD;
    // Below the default parking target (0.0 on axis 2), so the Hold
    // Initiator's parking-feasibility guard actually admits the retract.
    h.hal.position[2] = -10.0;
    h.spindle.set_state(SpindleModal::Cw, 12_000.0);
    h.coolant.set_state(CoolantState::FLOOD);
    h.stepper.stopped = false;

    assert_eq!(h.tick(RtExec::SAFETY_DOOR), SupervisorState::SafetyDoor);

    // Motion stops: the pull-out leg is submitted immediately this tick.
    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::SafetyDoor);
    assert_eq!(h.motion.executed, 1);
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::Retracting));

    // Pull-out leg lands: stepper buffer restored, spindle/coolant cleared,
    // fast retract to PARKING_TARGET submitted.
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::SafetyDoor);
    assert_eq!(h.spindle.current_rpm(), 0.0);
    assert_eq!(h.coolant.current_state(), CoolantState::empty());
    assert_eq!(h.motion.executed, 2);

    // Fast retract lands: parked, waiting at the target with the door open.
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::SafetyDoor);
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::DoorAjar));

    // Door closes, cycle-start submits the fast waypoint-bound restore leg.
    h.hal.door_ajar = false;
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::SafetyDoor);
    assert_eq!(h.motion.executed, 3);
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::Resuming));

    // Waypoint-bound leg lands: conditions restore, the slow plunge back to
    // `restore_target` is submitted with the snapshotted condition.
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::SafetyDoor);
    assert_eq!(h.spindle.current_rpm(), 12_000.0);
    assert_eq!(h.coolant.current_state(), CoolantState::FLOOD);
    assert_eq!(h.motion.executed, 4);

    // Plunge lands: back to Idle then straight through to Cycle.
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Cycle);
    assert_eq!(h.supervisor.parking_state(), None);
    assert!(!h.supervisor.suspend());
}

// Scenario 5: door re-opens during the restore plunge, forcing
// a clean re-retract that preserves the original `restore_target`.
#[test]
fn scenario_5_door_reopens_during_restore_plunge() {
    let mut h = Harness::new();
    h.tick(RtExec::CYCLE_START);
    h.gcode.modal_spindle = SpindleModal::Cw;
    h.gcode.modal_coolant = CoolantState::FLOOD;
    h.hal.position[2] = -10.0;
    h.spindle.set_state(SpindleModal::Cw, 8_000.0);
    h.stepper.stopped = false;
    h.tick(RtExec::SAFETY_DOOR);

    h.stepper.stopped = true;
    h.tick(RtExec::CYCLE_COMPLETE); // pull-out leg submitted
    h.tick(RtExec::CYCLE_COMPLETE); // pull-out lands, fast retract submitted
    h.tick(RtExec::CYCLE_COMPLETE); // fast retract lands, parked

    h.hal.door_ajar = false;
    h.tick(RtExec::CYCLE_START); // waypoint-bound restore leg submitted
    h.tick(RtExec::CYCLE_COMPLETE); // restore leg lands, plunge submitted

    let executed_before_reopen = h.motion.executed;
    let rpm_before_reopen = h.spindle.rpm;

    // Door reopens mid-plunge.
    assert_eq!(h.tick(RtExec::SAFETY_DOOR), SupervisorState::SafetyDoor);
    assert!(h.supervisor.door_reopened());
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::Retracting));

    // The next CYCLE_COMPLETE re-enters the retract step from the top; the
    // machine never actually moved during the aborted plunge, so it is
    // already sitting at the pull-out waypoint and this collapses straight
    // through to the fast leg back toward the parking target.
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::SafetyDoor);
    assert!(h.motion.executed > executed_before_reopen);

    // Fast leg lands: parked again, waiting for the door to close.
    h.tick(RtExec::CYCLE_COMPLETE);
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::DoorAjar));

    // Drive the whole restore sequence to completion again; the final
    // resume must still land on the original pre-hold spindle RPM, proving
    // `restore_target` and the condition snapshot survived the reopen.
    h.hal.door_ajar = false;
    h.tick(RtExec::CYCLE_START); // waypoint-bound restore leg
    h.tick(RtExec::CYCLE_COMPLETE); // restore leg lands, plunge submitted
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Cycle);
    assert_eq!(h.spindle.current_rpm(), rpm_before_reopen);
}

// Scenario 6: cycle-start with an empty planner is a silent
// no-op.
#[test]
fn scenario_6_cycle_start_with_empty_planner() {
    let mut h = Harness::new();
    h.planner.condition = BlockCondition::Idle;
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::Idle);
    assert_eq!(h.stepper.reset_count, 0);
}

// An override requested while the machine is still decelerating into a
// plain `Hold` de-energizes the spindle on the landing `CYCLE_COMPLETE` and
// stays latched through the next `CYCLE_START`: the restore branch only
// fires on `restore`/`restore_cycle`, and `restore_cycle` is only set when
// no override is active yet, so an override that reached `enabled` this
// same hold is never auto-cleared by a bare resume.
#[test]
fn spindle_stop_override_stays_engaged_through_resume() {
    let mut h = Harness::new();
    h.tick(RtExec::CYCLE_START);
    h.gcode.modal_spindle = SpindleModal::Cw;
    h.spindle.set_state(SpindleModal::Cw, 10_000.0);
    h.stepper.stopped = false;
    h.tick(RtExec::FEED_HOLD);
    assert_eq!(h.supervisor.holding_state(), HoldingState::Pending);

    h.supervisor.request_spindle_stop_override();
    assert!(h.supervisor.spindle_stop_override().initiate);

    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Hold);
    assert_eq!(h.supervisor.holding_state(), HoldingState::Complete);
    assert_eq!(h.spindle.current_rpm(), 0.0);
    assert!(h
        .report
        .messages
        .contains(&FeedbackMessage::SpindleStopOverrideActive));
    assert!(h.supervisor.spindle_stop_override().enabled);

    // A bare resume restarts the cycle but leaves the spindle off and the
    // override engaged: nothing ever set `restore` or `restore_cycle`.
    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::Cycle);
    assert_eq!(h.spindle.current_rpm(), 0.0);
    assert!(!h
        .report
        .messages
        .contains(&FeedbackMessage::SpindleStopOverrideRestored));
    assert!(h.supervisor.spindle_stop_override().is_active());
}

// Sleep has no dedicated RtExec bit; an external caller (the idle-timeout
// watcher, out of scope here) drives it by calling `set_state` directly
// rather than posting an event, but from there it runs the identical
// parking-hold protocol as SafetyDoor.
#[test]
fn sleep_runs_the_same_parking_protocol_as_safety_door() {
    let mut h = Harness::new();
    h.tick(RtExec::CYCLE_START);
    h.gcode.modal_spindle = SpindleModal::Cw;
    h.hal.position[2] = -10.0;
    h.spindle.set_state(SpindleModal::Cw, 9_000.0);
    h.stepper.stopped = false;

    let mut env = Env {
        planner: &mut h.planner,
        stepper: &mut h.stepper,
        spindle: &mut h.spindle,
        coolant: &mut h.coolant,
        gcode: &mut h.gcode,
        hal: &mut h.hal,
        report: &mut h.report,
        overrides: &mut h.overrides,
        motion: &mut h.motion,
        delay: &mut h.delay,
        events: &h.mailbox,
    };
    h.supervisor.set_state(SupervisorState::Sleep, &mut env);
    assert_eq!(h.supervisor.state(), SupervisorState::Sleep);
    assert!(h.supervisor.suspend());

    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Sleep);
    assert_eq!(h.supervisor.parking_state(), Some(ParkingState::Retracting));

    // Sleep only clears on reset, which is outside this crate's scope; it
    // is never resumed via CYCLE_START the way SafetyDoor is.
}

// `initiate_hold` must stay silent regardless of target: `SafetyDoorAjar`
// is `set_state`'s own feedback for the door case, and `Sleep` never
// reports anything at all, including when the machine is already at rest
// (no deceleration in flight) the instant Sleep is requested.
#[test]
fn sleep_with_machine_already_stopped_emits_no_feedback() {
    let mut h = Harness::new();
    h.tick(RtExec::CYCLE_START);
    h.stepper.stopped = true;

    let mut env = Env {
        planner: &mut h.planner,
        stepper: &mut h.stepper,
        spindle: &mut h.spindle,
        coolant: &mut h.coolant,
        gcode: &mut h.gcode,
        hal: &mut h.hal,
        report: &mut h.report,
        overrides: &mut h.overrides,
        motion: &mut h.motion,
        delay: &mut h.delay,
        events: &h.mailbox,
    };
    h.supervisor.set_state(SupervisorState::Sleep, &mut env);
    assert_eq!(h.supervisor.state(), SupervisorState::Sleep);
    assert!(h.report.messages.is_empty());
}

// With no override ever requested, resuming a plain hold marks
// `restore_cycle` automatically and spins the spindle back up to its
// pre-hold condition.
#[test]
fn plain_hold_resume_restores_spindle_via_restore_cycle() {
    let mut h = Harness::new();
    h.tick(RtExec::CYCLE_START);
    h.gcode.modal_spindle = SpindleModal::Cw;
    h.spindle.set_state(SpindleModal::Cw, 7_500.0);
    h.stepper.stopped = false;
    h.tick(RtExec::FEED_HOLD);

    h.stepper.stopped = true;
    assert_eq!(h.tick(RtExec::CYCLE_COMPLETE), SupervisorState::Hold);
    assert!(!h.supervisor.spindle_stop_override().is_active());

    assert_eq!(h.tick(RtExec::CYCLE_START), SupervisorState::Cycle);
    assert_eq!(h.spindle.current_rpm(), 7_500.0);
    assert!(h.report.messages.contains(&FeedbackMessage::SpindleRestore));
    assert!(!h
        .report
        .messages
        .contains(&FeedbackMessage::SpindleStopOverrideRestored));
    assert!(!h.supervisor.spindle_stop_override().is_active());
}
