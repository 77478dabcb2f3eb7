//! Top-level supervisory state and its holding/parking sub-states.
//!
//! `SupervisorState` is a flat tag with no embedded data: exactly one of a
//! fixed set of states is active at a time. `HoldingState` and
//! `ParkingState` are carried as separate fields on
//! `cnc_supervisor_core::Supervisor` rather than nested inside the state
//! enum, keeping the suspend sub-state orthogonal to the top-level state.
//! Dispatch itself is driven by a distinct "installed handler" slot
//! (`cnc_supervisor_core::handlers::ActiveHandler`) rather than matching on
//! the state enum at every tick.

/// The machine's current supervisory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SupervisorState {
    Idle = 0,
    Cycle = 1,
    Jog = 2,
    Hold = 3,
    SafetyDoor = 4,
    Sleep = 5,
    ToolChange = 6,
    Homing = 7,
    Alarm = 8,
    EStop = 9,
    CheckMode = 10,
}

impl Default for SupervisorState {
    fn default() -> Self {
        SupervisorState::Idle
    }
}

impl SupervisorState {
    /// States in which motion is suspended and a hold/restore protocol
    /// governs the path back to `Idle`/`Cycle`.
    pub const fn suspends(self) -> bool {
        matches!(
            self,
            SupervisorState::Hold
                | SupervisorState::SafetyDoor
                | SupervisorState::Sleep
                | SupervisorState::ToolChange
        )
    }

    /// `true` for the two states the parking sub-protocol may run under.
    pub const fn is_door(self) -> bool {
        matches!(self, SupervisorState::SafetyDoor | SupervisorState::Sleep)
    }

    /// `true` for the states whose dispatcher entry is always refused.
    pub const fn refuses_safety_door(self) -> bool {
        matches!(
            self,
            SupervisorState::Alarm
                | SupervisorState::EStop
                | SupervisorState::Sleep
                | SupervisorState::CheckMode
        )
    }
}

/// Sub-state of a suspended (`Hold`/`SafetyDoor`/`Sleep`/`ToolChange`) cycle.
/// Tracked alongside `SupervisorState` rather than inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HoldingState {
    /// No hold in progress; the default outside the four suspending states.
    NotHolding = 0,
    /// Deceleration requested, waiting for the stepper to report the motion
    /// has actually stopped.
    Pending = 1,
    /// Motion has stopped, at zero velocity. The machine may now be
    /// parking, waiting on an operator, or restoring conditions before
    /// resume — all of that detail lives in `ParkingState`/the installed
    /// handler, not here.
    Complete = 2,
}

impl Default for HoldingState {
    fn default() -> Self {
        HoldingState::NotHolding
    }
}

/// Sub-state of the parking retract/restore protocol, carried while in
/// `SupervisorState::SafetyDoor` or `Sleep` with parking enabled. `None` on
/// the owning `Supervisor` means no parking protocol is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParkingState {
    /// A retract motion (pull-out or the faster waypoint-to-target leg) is
    /// in flight, or about to be submitted.
    Retracting = 0,
    /// Sitting at the parking waypoint/target, door still open.
    DoorAjar = 1,
    /// Restoring position (and, once the waypoint-to-retract leg lands,
    /// conditions and the final plunge) back toward the point motion was
    /// interrupted.
    Resuming = 2,
}
