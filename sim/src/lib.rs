//! Library half of the simulation harness: mock collaborators and config
//! loading, shared between the `cnc-sim` demo binary and the integration
//! tests under `tests/`.

pub mod config;
pub mod mocks;
