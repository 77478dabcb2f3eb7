//! Modal spindle/coolant state captured and restored around a hold.

use bitflags::bitflags;

bitflags! {
    /// Which coolant circuits are commanded on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CoolantState: u8 {
        const FLOOD = 0x01;
        const MIST  = 0x02;
    }
}

/// Commanded spindle direction/state at the moment a hold was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpindleModal {
    #[default]
    Off,
    Cw,
    Ccw,
}

impl SpindleModal {
    pub const fn is_on(self) -> bool {
        !matches!(self, SpindleModal::Off)
    }
}

/// A point-in-time capture of the spindle/coolant modal state, taken when a
/// hold begins so the Condition Restorer can reinstate it before motion
/// resumes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConditionSnapshot {
    pub spindle_modal: SpindleModal,
    pub coolant_modal: CoolantState,
    pub spindle_rpm: f64,
}

impl ConditionSnapshot {
    /// Capture the given modal state, e.g. at the start of `initiate_hold`.
    pub fn capture(spindle_modal: SpindleModal, coolant_modal: CoolantState, spindle_rpm: f64) -> Self {
        Self {
            spindle_modal,
            coolant_modal,
            spindle_rpm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolant_state_roundtrip() {
        let state = CoolantState::FLOOD | CoolantState::MIST;
        assert_eq!(CoolantState::from_bits(state.bits()).unwrap(), state);
    }

    #[test]
    fn spindle_modal_default_is_off() {
        assert_eq!(SpindleModal::default(), SpindleModal::Off);
        assert!(!SpindleModal::Off.is_on());
        assert!(SpindleModal::Cw.is_on());
        assert!(SpindleModal::Ccw.is_on());
    }

    #[test]
    fn capture_stores_all_fields() {
        let snap = ConditionSnapshot::capture(SpindleModal::Cw, CoolantState::FLOOD, 12000.0);
        assert_eq!(snap.spindle_modal, SpindleModal::Cw);
        assert_eq!(snap.coolant_modal, CoolantState::FLOOD);
        assert_eq!(snap.spindle_rpm, 12000.0);
    }
}
