//! Supervisor tuning parameters.
//!
//! Pure data — `serde`-derived so `cnc-supervisor-sim` can load it from TOML,
//! but this crate has no file I/O of its own.

use serde::{Deserialize, Serialize};

/// Parking retract/restore tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingConfig {
    /// `PARKING_ENABLE`. A runtime switch rather than a compile-time
    /// `#[cfg]` split: a machine without a parking axis simply sets this
    /// `false` and `SafetyDoor`/`Sleep` behave like a plain `Hold`.
    pub enabled: bool,
    /// `PARKING_AXIS`: index into the axis arrays of the axis retracted
    /// along.
    pub axis: usize,
    /// `PARKING_TARGET`: final retracted position on the parking axis.
    pub target: f64,
    /// `PARKING_PULLOUT_INCREMENT`: distance added to the position at the
    /// moment parking began to get the pull-out waypoint.
    pub pullout_increment: f64,
    /// `PARKING_PULLOUT_RATE`: feed rate for the initial slow pull-out leg
    /// and the final plunge back.
    pub pullout_rate: f64,
    /// `PARKING_RATE`: feed rate for the fast waypoint<->target legs.
    pub rate: f64,
    /// `PARKING_MOTION_LINE_NUMBER`: line number attributed to the
    /// internally-generated parking motions.
    pub motion_line_number: u32,
}

impl Default for ParkingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            axis: 2,
            target: 0.0,
            pullout_increment: 5.0,
            pullout_rate: 600.0,
            rate: 5000.0,
            motion_line_number: 0,
        }
    }
}

/// Delays applied by the Condition Restorer while bringing the spindle and
/// coolant back up before motion resumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorDelayConfig {
    /// `SAFETY_DOOR_SPINDLE_DELAY`: seconds to wait for the spindle to spin
    /// back up when the HAL reports no at-speed feedback capability.
    pub spindle_delay_sec: f64,
    /// `SAFETY_DOOR_COOLANT_DELAY`: seconds to wait for the coolant circuit
    /// to re-establish after being switched back on.
    pub coolant_delay_sec: f64,
    /// Upper bound in seconds on the spindle-at-speed busy-wait when the HAL
    /// *does* report at-speed feedback, before giving up and proceeding
    /// anyway, logged via `tracing::warn!` on timeout.
    pub spindle_sync_timeout_sec: f64,
}

impl Default for DoorDelayConfig {
    fn default() -> Self {
        Self {
            spindle_delay_sec: 4.0,
            coolant_delay_sec: 2.2,
            spindle_sync_timeout_sec: 20.0,
        }
    }
}

/// Machine-wide mode flags consulted by the hold/park protocol. Modeled as
/// config rather than a live `Gcode`/`Hal` query since settings persistence
/// is out of scope here; a real build would back these with the settings
/// subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineFlags {
    /// `settings.flags.laser_mode`: spindle RPM changes are applied by the
    /// step generator rather than immediately, and parking/laser-stop
    /// behavior during a hold changes accordingly.
    pub laser_mode: bool,
    /// `settings.flags.homing_enable`: parking requires a homed machine to
    /// trust the parking-axis position.
    pub homing_enable: bool,
    /// `DISABLE_LASER_DURING_HOLD`: force the spindle (laser) off for the
    /// duration of any hold, regardless of the snapshot.
    pub disable_laser_during_hold: bool,
}

impl Default for MachineFlags {
    fn default() -> Self {
        Self {
            laser_mode: false,
            homing_enable: true,
            disable_laser_during_hold: true,
        }
    }
}

/// Which manual overrides the operator is permitted to apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideControl {
    /// `override_ctrl.feed_hold_disable`: operator has disabled feed-hold
    /// entirely.
    pub feed_hold_disable: bool,
    /// `override_ctrl.parking_disable`: operator has disabled the parking
    /// retract even though the feature is otherwise enabled and feasible.
    pub parking_disable: bool,
    /// Operator is permitted to request the spindle-stop override while
    /// holding (`Supervisor::request_spindle_stop_override`).
    pub spindle_stop_allowed: bool,
}

impl Default for OverrideControl {
    fn default() -> Self {
        Self {
            feed_hold_disable: false,
            parking_disable: false,
            spindle_stop_allowed: true,
        }
    }
}

/// Top-level supervisor configuration bundle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SupervisorConfig {
    pub parking: ParkingConfig,
    pub door_delay: DoorDelayConfig,
    pub machine: MachineFlags,
    pub overrides: OverrideControl,
}
