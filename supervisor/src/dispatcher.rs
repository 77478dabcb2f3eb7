use cnc_supervisor_common::collaborators::{
    AccessoryOverrides, Coolant, Gcode, Hal, Motion, Planner, Report, Spindle, Stepper,
};
use cnc_supervisor_common::{
    condition::ConditionSnapshot,
    config::SupervisorConfig,
    events::{EventMailbox, RtExec},
    flags::{SpindleStopOverride, StepControlFlags},
    park::ParkContext,
    state::{HoldingState, ParkingState, SupervisorState},
    Delay,
};

use crate::handlers::ActiveHandler;

/// Bundle of external collaborators a single [`Supervisor::update`] tick is
/// driven against, borrowed for the duration of the call. Each field is a
/// trait object so `cnc-supervisor-sim`'s mocks and a future embedded HAL can
/// both satisfy this interface without the core depending on either.
pub struct Env<'a> {
    pub planner: &'a mut dyn Planner,
    pub stepper: &'a mut dyn Stepper,
    pub spindle: &'a mut dyn Spindle,
    pub coolant: &'a mut dyn Coolant,
    pub gcode: &'a mut dyn Gcode,
    pub hal: &'a mut dyn Hal,
    pub report: &'a mut dyn Report,
    pub overrides: &'a mut dyn AccessoryOverrides,
    pub motion: &'a mut dyn Motion,
    pub delay: &'a mut dyn Delay,
    /// Read-only view of the pending realtime-event mailbox, sampled by the
    /// suspension-aware delay to detect a door reopening mid-wait without
    /// consuming the bit the dispatcher's own preemption check still needs.
    pub events: &'a EventMailbox,
}

/// Upper bound on how many times a handler may hand the dispatcher a
/// synthesized follow-up event (currently only `CYCLE_COMPLETE`, for the
/// zero-length-motion collapse) within a single `update()` call. A single
/// transition only ever synthesizes one event, but a park/restore sequence
/// can cross several transitions in one tick (retract lands zero-length,
/// then the very next leg also lands zero-length); this bound is generous
/// headroom against a logic bug turning into a hang rather than a loop
/// bound any legitimate cascade should ever hit.
const MAX_SYNTHESIS_CHAIN: u8 = 8;

/// The supervisory state machine itself.
#[derive(Debug)]
pub struct Supervisor {
    state: SupervisorState,
    holding: HoldingState,
    parking: Option<ParkingState>,
    handler: ActiveHandler,
    /// Non-suspended state to fall back into once a hold/park fully clears,
    /// or a motion-cancel tears down.
    pending_state: Option<SupervisorState>,
    condition: ConditionSnapshot,
    park: ParkContext,
    step_control: StepControlFlags,
    spindle_stop_ovr: SpindleStopOverride,
    suspend: bool,
    config: SupervisorConfig,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            state: SupervisorState::Idle,
            holding: HoldingState::NotHolding,
            parking: None,
            handler: ActiveHandler::Idle,
            pending_state: None,
            condition: ConditionSnapshot::default(),
            park: ParkContext::default(),
            step_control: StepControlFlags::empty(),
            spindle_stop_ovr: SpindleStopOverride::default(),
            suspend: false,
            config,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn holding_state(&self) -> HoldingState {
        self.holding
    }

    pub fn parking_state(&self) -> Option<ParkingState> {
        self.parking
    }

    pub fn suspend(&self) -> bool {
        self.suspend
    }

    pub fn step_control(&self) -> StepControlFlags {
        self.step_control
    }

    pub fn spindle_stop_override(&self) -> SpindleStopOverride {
        self.spindle_stop_ovr
    }

    /// Lets a long-running caller (e.g. a restore delay loop) bail out
    /// promptly when a door reopen has latched a re-retract.
    pub fn door_reopened(&self) -> bool {
        self.park.restart_retract
    }

    /// Enter `Jog`, the one state transition not triggered by an `RtExec`
    /// bit: jog mode is commanded directly by the g-code parser (out of
    /// scope here) whenever it accepts a jog block while the machine is
    /// `Idle`. A no-op from any other state.
    pub fn begin_jog(&mut self) {
        if self.state == SupervisorState::Idle {
            self.state = SupervisorState::Jog;
            self.handler = ActiveHandler::Cycle;
            tracing::debug!("entered jog");
        }
    }

    /// Enter `ToolChange`, commanded externally (by the g-code executor
    /// acting on M6, out of scope here) rather than by an `RtExec` bit. Goes
    /// through the same Hold Initiator as a feed-hold so the machine
    /// decelerates to a controlled stop before pausing for the operator.
    pub fn begin_tool_change(&mut self, env: &mut Env) {
        if matches!(self.state, SupervisorState::Idle | SupervisorState::Cycle) {
            let cycle_was_running = crate::hold::initiate_hold(self, SupervisorState::ToolChange, env);
            self.state = SupervisorState::ToolChange;
            if cycle_was_running {
                self.handler = ActiveHandler::AwaitHold;
            } else {
                self.holding = HoldingState::Complete;
                self.handler = ActiveHandler::AwaitResume;
            }
        }
    }

    /// Operator request to stop the spindle while held without aborting the
    /// hold, commanded externally (by the realtime command layer, out of
    /// scope here) rather than by an `RtExec` bit. Latched for
    /// `state_await_hold` to act on; a no-op if the operator has not been
    /// granted the permission.
    pub fn request_spindle_stop_override(&mut self) {
        if self.config.overrides.spindle_stop_allowed {
            self.spindle_stop_ovr.initiate = true;
        }
    }

    pub(crate) fn set_holding(&mut self, holding: HoldingState) {
        self.holding = holding;
    }

    pub(crate) fn set_parking(&mut self, parking: Option<ParkingState>) {
        self.parking = parking;
    }

    pub(crate) fn handler(&self) -> ActiveHandler {
        self.handler
    }

    pub(crate) fn install(&mut self, handler: ActiveHandler) {
        tracing::debug!(?handler, "installing handler");
        self.handler = handler;
    }

    pub(crate) fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    pub(crate) fn condition(&self) -> ConditionSnapshot {
        self.condition
    }

    pub(crate) fn set_condition(&mut self, condition: ConditionSnapshot) {
        self.condition = condition;
    }

    pub(crate) fn park_mut(&mut self) -> &mut ParkContext {
        &mut self.park
    }

    pub(crate) fn pending_state_mut(&mut self) -> &mut Option<SupervisorState> {
        &mut self.pending_state
    }

    pub(crate) fn step_control_mut(&mut self) -> &mut StepControlFlags {
        &mut self.step_control
    }

    pub(crate) fn spindle_stop_ovr_mut(&mut self) -> &mut SpindleStopOverride {
        &mut self.spindle_stop_ovr
    }

    pub(crate) fn set_suspend(&mut self, suspend: bool) {
        self.suspend = suspend;
    }

    /// The transition engine: `set_state(new_state)`. Idempotent on equal
    /// state; otherwise dispatches on `new_state`. Returns a synthesized
    /// event the dispatcher loop should re-enter with this same tick, for
    /// the transitions that need one.
    ///
    /// Public: `Sleep` has no dedicated `RtExec` bit (the idle-timeout
    /// watcher that would request it is out of scope here, per spec.md
    /// §1/§6), so it can only be reached by an external caller invoking
    /// `set_state(Sleep, ..)` directly, the same way `begin_jog`/
    /// `begin_tool_change` drive the other out-of-bitmask transitions.
    pub fn set_state(&mut self, new_state: SupervisorState, env: &mut Env) -> Option<RtExec> {
        if self.state == new_state {
            return None;
        }

        match new_state {
            SupervisorState::Idle => {
                self.suspend = false;
                self.step_control = StepControlFlags::empty();
                self.parking = None;
                self.holding = HoldingState::NotHolding;
                self.state = SupervisorState::Idle;
                self.handler = ActiveHandler::Idle;
                None
            }
            SupervisorState::Cycle => {
                if self.state != SupervisorState::Idle {
                    return None;
                }
                if env.planner.block_condition() == cnc_supervisor_common::collaborators::BlockCondition::Idle {
                    return None;
                }
                if let Some(block) = env.planner.current_block_spindle() {
                    if block.spindle_synchronized {
                        self.spindle_synchronized_entry(env);
                    }
                }
                env.stepper.prep_buffer();
                env.stepper.wake_up();
                self.state = SupervisorState::Cycle;
                self.handler = ActiveHandler::Cycle;
                None
            }
            SupervisorState::Jog => {
                self.state = SupervisorState::Jog;
                self.handler = ActiveHandler::Cycle;
                None
            }
            SupervisorState::Hold => {
                // Refused while jogging: jog is cancelled only via
                // `MOTION_CANCEL`, never decelerated through the feed-hold
                // path. Also refused when the operator has disabled
                // feed-hold via override.
                if self.state == SupervisorState::Jog || self.config.overrides.feed_hold_disable {
                    return None;
                }
                let cycle_was_running = crate::hold::initiate_hold(self, SupervisorState::Hold, env);
                self.state = SupervisorState::Hold;
                if cycle_was_running {
                    self.handler = ActiveHandler::AwaitHold;
                    None
                } else {
                    self.holding = HoldingState::Complete;
                    self.handler = ActiveHandler::AwaitResume;
                    None
                }
            }
            SupervisorState::SafetyDoor => {
                if self.state.refuses_safety_door() {
                    return None;
                }
                env.report
                    .feedback_message(cnc_supervisor_common::collaborators::FeedbackMessage::SafetyDoorAjar);
                self.enter_parking_hold(SupervisorState::SafetyDoor, env)
            }
            SupervisorState::Sleep => self.enter_parking_hold(SupervisorState::Sleep, env),
            SupervisorState::Alarm
            | SupervisorState::EStop
            | SupervisorState::Homing
            | SupervisorState::CheckMode => {
                self.state = new_state;
                self.handler = ActiveHandler::Noop;
                None
            }
            SupervisorState::ToolChange => {
                // Not reached via `set_state` in ordinary operation — see
                // `begin_tool_change` — but handled for completeness so the
                // match stays exhaustive and idempotent-on-repeat.
                let cycle_was_running = crate::hold::initiate_hold(self, SupervisorState::ToolChange, env);
                self.state = SupervisorState::ToolChange;
                if cycle_was_running {
                    self.handler = ActiveHandler::AwaitHold;
                } else {
                    self.holding = HoldingState::Complete;
                    self.handler = ActiveHandler::AwaitResume;
                }
                None
            }
        }
    }

    /// Shared tail of `→ SafetyDoor` and `→ Sleep`: emit a user feedback
    /// message and fall through into the common parking-hold entry.
    fn enter_parking_hold(&mut self, target: SupervisorState, env: &mut Env) -> Option<RtExec> {
        self.parking = Some(ParkingState::Retracting);
        let cycle_was_running = crate::hold::initiate_hold(self, target, env);
        self.state = target;
        self.handler = ActiveHandler::AwaitHold;
        if cycle_was_running {
            None
        } else {
            // No active motion to decelerate: synthesize `CYCLE_COMPLETE`
            // directly to `state_await_hold` so the park/de-energize step
            // still runs this tick.
            Some(RtExec::CYCLE_COMPLETE)
        }
    }

    /// Spindle-synchronized cycle entry: reset the spindle's index-pulse
    /// counter, then busy-wait until it has advanced by at least two edges,
    /// guaranteeing the first step is phase-locked to a known spindle
    /// position. Bounded by `spindle_sync_timeout_sec` with a `warn!` on
    /// timeout rather than looping forever.
    fn spindle_synchronized_entry(&mut self, env: &mut Env) {
        env.spindle.reset_sync_counter();
        let timeout = self.config.door_delay.spindle_sync_timeout_sec;
        let settled = env
            .delay
            .delay_sec(timeout, &mut || env.spindle.sync_edge_count() >= 2);
        if !settled {
            tracing::warn!(
                timeout_sec = timeout,
                "spindle-synchronized cycle entry timed out waiting for index pulses"
            );
        }
    }

    /// Process one realtime tick. `events` must already have been drained
    /// (read-and-cleared) from the shared [`EventMailbox`] by the caller;
    /// `env.events` remains available read-only for the suspension-aware
    /// delay to peek at bits posted *during* this very call.
    pub fn update(&mut self, events: RtExec, env: &mut Env) -> SupervisorState {
        // Safety-door preemption fires ahead of everything else, even
        // mid-`Cycle`/`Hold`/`Jog`/mid-restore.
        let mut pending = if events.contains(RtExec::SAFETY_DOOR) && !self.state.is_door() {
            self.set_state(SupervisorState::SafetyDoor, env).unwrap_or(RtExec::empty())
        } else {
            events
        };

        for _ in 0..MAX_SYNTHESIS_CHAIN {
            match crate::handlers::dispatch(self, pending, env) {
                Some(synthesized) => pending = synthesized,
                None => return self.state,
            }
        }
        tracing::warn!(
            limit = MAX_SYNTHESIS_CHAIN,
            "synthesized-event chain hit its bound; stopping re-entry this tick"
        );
        self.state
    }
}
