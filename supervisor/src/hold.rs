//! The Hold Initiator: shared setup run on entry to `Hold`, `SafetyDoor`,
//! `Sleep`, and `ToolChange` alike, regardless of whether motion was
//! actually running when the hold was requested.

use cnc_supervisor_common::condition::ConditionSnapshot;
use cnc_supervisor_common::flags::StepControlFlags;
use cnc_supervisor_common::state::{HoldingState, SupervisorState};

use crate::dispatcher::{Env, Supervisor};

/// Snapshot modal condition, request deceleration if a cycle was running,
/// and reset park bookkeeping. Returns `true` if a cycle was actually
/// running and is now decelerating (caller should leave
/// `HoldingState::Pending` and install `state_await_hold`), `false` if the
/// machine was already at rest (caller should set `HoldingState::Complete`
/// immediately and install `state_await_resume`).
pub(crate) fn initiate_hold(sup: &mut Supervisor, target: SupervisorState, env: &mut Env) -> bool {
    sup.park_mut().reset_for_hold();

    // Condition Snapshot: prefer the in-flight block's own spindle/coolant
    // condition over the parser's modal state, since the block may carry a
    // different M-code state than what the parser has already moved past.
    // With no block in flight, the parser's modal coolant state is OR-ed
    // with the hardware's actual coolant state, since coolant may have been
    // switched on manually without going through a modal M-code.
    let snapshot = match env.planner.current_block_spindle() {
        Some(block) => ConditionSnapshot::capture(block.modal, env.coolant.current_state(), block.rpm),
        None => ConditionSnapshot::capture(
            env.gcode.modal_spindle(),
            env.gcode.modal_coolant() | env.coolant.current_state(),
            env.spindle.current_rpm(),
        ),
    };
    sup.set_condition(snapshot);

    let flags = &sup.config().machine;
    if flags.laser_mode && flags.disable_laser_during_hold {
        env.overrides.enqueue_spindle_stop();
    }

    // `pending_state` records what to fall back to once the hold/park fully
    // clears: the actual target only when interrupting a `Jog` (a jog is
    // discarded rather than resumed once it clears), otherwise `Idle` —
    // an ordinary interrupted cycle resumes via an operator `CYCLE_START`
    // rather than an automatic fall-through.
    *sup.pending_state_mut() = Some(if sup.state() == SupervisorState::Jog {
        target
    } else {
        SupervisorState::Idle
    });

    let cycle_running = sup.state() == SupervisorState::Cycle && !env.stepper.is_stopped();

    if cycle_running {
        sup.step_control_mut().insert(StepControlFlags::EXECUTE_HOLD);
        env.planner.recompute_deceleration();
        env.stepper.request_stop();
        sup.set_holding(HoldingState::Pending);
        sup.set_suspend(true);
        true
    } else {
        env.stepper.request_stop();
        sup.set_holding(HoldingState::Complete);
        sup.set_suspend(true);
        false
    }
}
