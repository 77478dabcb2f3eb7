//! State handlers: one module per installed handler, each a free function
//! `run(sup, events, env) -> Option<RtExec>`. A `Some(bits)` return asks the
//! dispatcher to immediately re-enter with `bits` as the event set for this
//! same tick — used to synthesize `CYCLE_COMPLETE` for the
//! zero-length-motion collapse and for the parking-hold fast path where no
//! cycle was running to decelerate in the first place.

mod await_hold;
mod await_motion_cancel;
mod await_resume;
mod await_resumed;
mod await_waypoint_retract;
mod cycle;
mod idle;
mod noop;
mod restore_state;

use crate::dispatcher::{Env, Supervisor};
use cnc_supervisor_common::events::RtExec;

/// Which handler function is currently installed — the Rust translation of
/// the source's function-pointer-per-state table into an exhaustively
/// matched enum. Distinct from `SupervisorState`: several states share a
/// handler (`Cycle` and `Jog` both install `Cycle` until a motion-cancel
/// swaps in `AwaitMotionCancel`; `Hold`/`SafetyDoor`/`Sleep`/`ToolChange` all
/// cycle through the same `AwaitHold` -> `AwaitWaypointRetract`/`AwaitResume`
/// -> `RestoreState` -> `AwaitResumed` sequence). `RestoreState` and
/// `AwaitResumed` are kept as two distinct handlers, not one, because a door
/// reopening in either one reacts identically but needs to be told apart
/// from ordinary `CYCLE_COMPLETE` handling in each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveHandler {
    Idle,
    Cycle,
    AwaitMotionCancel,
    AwaitHold,
    AwaitWaypointRetract,
    AwaitResume,
    RestoreState,
    AwaitResumed,
    Noop,
}

pub(crate) fn dispatch(sup: &mut Supervisor, events: RtExec, env: &mut Env) -> Option<RtExec> {
    match sup.handler() {
        ActiveHandler::Idle => idle::run(sup, events, env),
        ActiveHandler::Cycle => cycle::run(sup, events, env),
        ActiveHandler::AwaitMotionCancel => await_motion_cancel::run(sup, events, env),
        ActiveHandler::AwaitHold => await_hold::run(sup, events, env),
        ActiveHandler::AwaitWaypointRetract => await_waypoint_retract::run(sup, events, env),
        ActiveHandler::AwaitResume => await_resume::run(sup, events, env),
        ActiveHandler::RestoreState => restore_state::run(sup, events, env),
        ActiveHandler::AwaitResumed => await_resumed::run(sup, events, env),
        ActiveHandler::Noop => noop::run(sup, events, env),
    }
}
