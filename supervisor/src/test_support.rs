//! Minimal mock collaborators for this crate's own inline unit tests.
//! `cnc-supervisor-sim` provides the fuller, TOML-configurable mocks used
//! for integration testing; these exist purely so `dispatcher`/`hold`/
//! `restore`/`handlers` can each exercise their own logic in isolation
//! without pulling in the `sim` crate as a dev-dependency.

use cnc_supervisor_common::collaborators::{
    AccessoryOverrides, BlockCondition, BlockSpindleState, Coolant, FeedbackMessage, Gcode, Hal, Motion, Planner,
    Report, Spindle, Stepper,
};
use cnc_supervisor_common::condition::{CoolantState, SpindleModal};
use cnc_supervisor_common::consts::MAX_AXES;
use cnc_supervisor_common::park::ParkPlanData;
use cnc_supervisor_common::events::EventMailbox;
use cnc_supervisor_common::Delay;

use crate::dispatcher::Env;

pub(crate) struct MockPlanner {
    pub condition: BlockCondition,
    pub current_block: Option<BlockSpindleState>,
}

impl Default for MockPlanner {
    fn default() -> Self {
        Self {
            condition: BlockCondition::Active,
            current_block: None,
        }
    }
}

impl Planner for MockPlanner {
    fn block_condition(&self) -> BlockCondition {
        self.condition
    }
    fn current_block_spindle(&self) -> Option<BlockSpindleState> {
        self.current_block
    }
    fn reset(&mut self) {}
    fn sync_position(&mut self) {}
    fn recompute_deceleration(&mut self) {}
    fn cycle_reinitialize(&mut self) {}
    fn plan_system_motion(&mut self, _plan: ParkPlanData) {}
}

#[derive(Default)]
pub(crate) struct MockStepper {
    pub stopped: bool,
}

impl Stepper for MockStepper {
    fn request_stop(&mut self) {
        self.stopped = true;
    }
    fn is_stopped(&self) -> bool {
        self.stopped
    }
    fn prep_buffer(&mut self) {}
    fn wake_up(&mut self) {
        self.stopped = false;
    }
    fn reset(&mut self) {
        self.stopped = true;
    }
    fn parking_restore_buffer(&mut self) {}
}

#[derive(Default)]
pub(crate) struct MockSpindle {
    pub rpm: f64,
    pub sync_edges: u32,
}

impl Spindle for MockSpindle {
    fn set_state(&mut self, _modal: SpindleModal, rpm: f64) {
        self.rpm = rpm;
    }
    fn stop(&mut self) {
        self.rpm = 0.0;
    }
    fn current_rpm(&self) -> f64 {
        self.rpm
    }
    fn at_speed(&self, _target_rpm: f64) -> bool {
        true
    }
    fn reset_sync_counter(&mut self) {
        self.sync_edges = 0;
    }
    fn sync_edge_count(&self) -> u32 {
        self.sync_edges
    }
}

#[derive(Default)]
pub(crate) struct MockCoolant {
    pub state: CoolantState,
}

impl Coolant for MockCoolant {
    fn set_state(&mut self, state: CoolantState) {
        self.state = state;
    }
    fn current_state(&self) -> CoolantState {
        self.state
    }
}

#[derive(Default)]
pub(crate) struct MockGcode;

impl Gcode for MockGcode {
    fn modal_spindle(&self) -> SpindleModal {
        SpindleModal::Off
    }
    fn modal_coolant(&self) -> CoolantState {
        CoolantState::empty()
    }
    fn sync_position(&mut self) {}
}

#[derive(Default)]
pub(crate) struct MockHal {
    pub position: [f64; MAX_AXES],
    pub door_ajar: bool,
    pub at_speed_capable: bool,
}

impl Hal for MockHal {
    fn position(&self) -> [f64; MAX_AXES] {
        self.position
    }
    fn door_ajar(&self) -> bool {
        self.door_ajar
    }
    fn spindle_at_speed_capable(&self) -> bool {
        self.at_speed_capable
    }
}

#[derive(Default)]
pub(crate) struct MockReport {
    pub messages: Vec<FeedbackMessage>,
}

impl Report for MockReport {
    fn feedback_message(&mut self, message: FeedbackMessage) {
        self.messages.push(message);
    }
}

#[derive(Default)]
pub(crate) struct MockOverrides {
    pub spindle_stop: bool,
}

impl AccessoryOverrides for MockOverrides {
    fn enqueue_spindle_stop(&mut self) {
        self.spindle_stop = true;
    }
}

#[derive(Default)]
pub(crate) struct MockMotion {
    pub zero_length: bool,
}

impl Motion for MockMotion {
    fn execute_system_motion(&mut self, _plan: &ParkPlanData) -> bool {
        !self.zero_length
    }
}

#[derive(Default)]
pub(crate) struct ImmediateDelay {
    pub calls: u32,
}

impl Delay for ImmediateDelay {
    fn delay_sec(&mut self, _seconds: f64, poll: &mut dyn FnMut() -> bool) -> bool {
        self.calls += 1;
        poll()
    }
}

pub(crate) struct Fixture {
    pub planner: MockPlanner,
    pub stepper: MockStepper,
    pub spindle: MockSpindle,
    pub coolant: MockCoolant,
    pub gcode: MockGcode,
    pub hal: MockHal,
    pub report: MockReport,
    pub overrides: MockOverrides,
    pub motion: MockMotion,
    pub delay: ImmediateDelay,
    pub events: EventMailbox,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            planner: MockPlanner::default(),
            stepper: MockStepper { stopped: true },
            spindle: MockSpindle::default(),
            coolant: MockCoolant::default(),
            gcode: MockGcode::default(),
            hal: MockHal::default(),
            report: MockReport::default(),
            overrides: MockOverrides::default(),
            motion: MockMotion::default(),
            delay: ImmediateDelay::default(),
            events: EventMailbox::new(),
        }
    }

    pub fn env(&mut self) -> Env<'_> {
        Env {
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
            events: &self.events,
        }
    }
}
