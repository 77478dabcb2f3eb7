//! The supervisory state machine core.
//!
//! `Supervisor` owns the state/sub-state/hold bookkeeping; [`Env`] bundles
//! the external collaborators (planner, stepper, spindle, ...) a tick needs.
//! Dispatch installs one of a small set of handler functions into an
//! `ActiveHandler` slot, an exhaustively-matched enum standing in for a
//! function-pointer-per-state table.

mod dispatcher;
mod handlers;
mod hold;
mod restore;
#[cfg(test)]
mod test_support;

pub use dispatcher::{Env, Supervisor};
pub use handlers::ActiveHandler;
