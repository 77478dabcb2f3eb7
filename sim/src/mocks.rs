//! In-memory stand-ins for the external collaborators, used by both
//! `main.rs`'s demo loop and the integration tests in `tests/`. Each trait
//! gets its own small struct rather than one god-object, so a
//! `supervisor::Env` can borrow each collaborator independently — the same
//! shape the `dispatcher`/`restore`/`hold` unit tests in
//! `cnc-supervisor-core` use.

use cnc_supervisor_common::collaborators::*;
use cnc_supervisor_common::condition::{CoolantState, SpindleModal};
use cnc_supervisor_common::consts::MAX_AXES;
use cnc_supervisor_common::park::ParkPlanData;
use cnc_supervisor_common::Delay;

#[derive(Debug)]
pub struct SimPlanner {
    pub condition: BlockCondition,
    pub current_block: Option<BlockSpindleState>,
    pub reset_count: u32,
    pub planned_motions: Vec<ParkPlanData>,
}

impl Default for SimPlanner {
    fn default() -> Self {
        Self {
            condition: BlockCondition::Idle,
            current_block: None,
            reset_count: 0,
            planned_motions: Vec::new(),
        }
    }
}

impl Planner for SimPlanner {
    fn block_condition(&self) -> BlockCondition {
        self.condition
    }
    fn current_block_spindle(&self) -> Option<BlockSpindleState> {
        self.current_block
    }
    fn reset(&mut self) {
        self.reset_count += 1;
        self.condition = BlockCondition::Idle;
        self.current_block = None;
    }
    fn sync_position(&mut self) {}
    fn recompute_deceleration(&mut self) {}
    fn cycle_reinitialize(&mut self) {}
    fn plan_system_motion(&mut self, plan: ParkPlanData) {
        self.planned_motions.push(plan);
        self.condition = BlockCondition::Active;
    }
}

#[derive(Debug, Default)]
pub struct SimStepper {
    pub stopped: bool,
    pub reset_count: u32,
    pub restore_buffer_count: u32,
}

impl Stepper for SimStepper {
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
        self.reset_count += 1;
        self.stopped = true;
    }
    fn parking_restore_buffer(&mut self) {
        self.restore_buffer_count += 1;
    }
}

#[derive(Debug, Default)]
pub struct SimSpindle {
    pub modal: SpindleModal,
    pub rpm: f64,
    /// When `false`, `at_speed` always reports not-yet-settled regardless of
    /// `rpm`, so tests can exercise the bounded-timeout path.
    pub reaches_speed: bool,
    pub sync_edges: u32,
}

impl Spindle for SimSpindle {
    fn set_state(&mut self, modal: SpindleModal, rpm: f64) {
        self.modal = modal;
        self.rpm = rpm;
    }
    fn stop(&mut self) {
        self.modal = SpindleModal::Off;
        self.rpm = 0.0;
    }
    fn current_rpm(&self) -> f64 {
        self.rpm
    }
    fn at_speed(&self, target_rpm: f64) -> bool {
        self.reaches_speed && self.rpm >= target_rpm
    }
    fn reset_sync_counter(&mut self) {
        self.sync_edges = 0;
    }
    fn sync_edge_count(&self) -> u32 {
        self.sync_edges
    }
}

#[derive(Debug, Default)]
pub struct SimCoolant {
    pub state: CoolantState,
}

impl Coolant for SimCoolant {
    fn set_state(&mut self, state: CoolantState) {
        self.state = state;
    }
    fn current_state(&self) -> CoolantState {
        self.state
    }
}

#[derive(Debug, Default)]
pub struct SimGcode {
    pub modal_spindle: SpindleModal,
    pub modal_coolant: CoolantState,
    pub position_synced: u32,
}

impl Gcode for SimGcode {
    fn modal_spindle(&self) -> SpindleModal {
        self.modal_spindle
    }
    fn modal_coolant(&self) -> CoolantState {
        self.modal_coolant
    }
    fn sync_position(&mut self) {
        self.position_synced += 1;
    }
}

#[derive(Debug)]
pub struct SimHal {
    pub position: [f64; MAX_AXES],
    pub door_ajar: bool,
    pub at_speed_capable: bool,
}

impl Default for SimHal {
    fn default() -> Self {
        Self {
            position: [0.0; MAX_AXES],
            door_ajar: false,
            at_speed_capable: true,
        }
    }
}

impl Hal for SimHal {
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

#[derive(Debug, Default)]
pub struct SimReport {
    pub messages: Vec<FeedbackMessage>,
}

impl Report for SimReport {
    fn feedback_message(&mut self, message: FeedbackMessage) {
        tracing::info!(?message, "feedback");
        self.messages.push(message);
    }
}

#[derive(Debug, Default)]
pub struct SimOverrides {
    pub spindle_stop: bool,
}

impl AccessoryOverrides for SimOverrides {
    fn enqueue_spindle_stop(&mut self) {
        self.spindle_stop = true;
    }
}

#[derive(Debug, Default)]
pub struct SimMotion {
    pub executed: u32,
    /// When set, the next `execute_system_motion` call reports a
    /// zero-length move instead of dispatching, so tests can exercise the
    /// synthesized-`CYCLE_COMPLETE` collapse.
    pub zero_length: bool,
}

impl Motion for SimMotion {
    fn execute_system_motion(&mut self, _plan: &ParkPlanData) -> bool {
        if self.zero_length {
            return false;
        }
        self.executed += 1;
        true
    }
}

/// A delay that never actually sleeps: it calls `poll` once and returns
/// immediately, which is all an integration test needs to exercise the
/// suspension-aware abort path without a real clock.
#[derive(Debug, Default)]
pub struct SimDelay {
    pub calls: u32,
}

impl Delay for SimDelay {
    fn delay_sec(&mut self, _seconds: f64, poll: &mut dyn FnMut() -> bool) -> bool {
        self.calls += 1;
        poll()
    }
}
