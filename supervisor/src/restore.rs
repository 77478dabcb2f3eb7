//! Condition Restorer: brings spindle/coolant back to the snapshot taken at
//! hold time before motion is allowed to resume.
//!
//! Each wait is suspension-aware: it polls for a freshly-posted
//! `SAFETY_DOOR` bit (via [`Env::events`]) on every step rather than
//! sleeping unconditionally, so a door reopening mid-restore is caught
//! within the same tick instead of waiting out the full delay first.

use crate::dispatcher::{Env, Supervisor};
use cnc_supervisor_common::events::RtExec;
use cnc_supervisor_common::flags::StepControlFlags;

/// Attempt to restore spindle and coolant to their snapshotted state.
/// Returns `true` once both are settled, `false` if the restore was aborted
/// because the door reopened (in which case `sup.park_mut().restart_retract`
/// has been latched for the caller to act on).
pub(crate) fn restore_conditions(sup: &mut Supervisor, env: &mut Env) -> bool {
    let condition = sup.condition();
    let laser_mode = sup.config().machine.laser_mode;

    // In laser mode the spindle (laser) was already forced off for the
    // whole hold (`DISABLE_LASER_DURING_HOLD`); rather than commanding it
    // back up front and waiting for at-speed, defer to the step generator by
    // asking it to re-apply RPM at the first step of the next move.
    if condition.spindle_modal.is_on() && laser_mode {
        sup.step_control_mut().insert(StepControlFlags::UPDATE_SPINDLE_RPM);
    } else if condition.spindle_modal.is_on() {
        env.spindle.set_state(condition.spindle_modal, condition.spindle_rpm);

        let rpm = condition.spindle_rpm;
        if env.hal.spindle_at_speed_capable() {
            let timeout = sup.config().door_delay.spindle_sync_timeout_sec;
            let settled = env.delay.delay_sec(timeout, &mut || {
                env.spindle.at_speed(rpm) || env.events.peek().contains(RtExec::SAFETY_DOOR)
            });
            if env.events.peek().contains(RtExec::SAFETY_DOOR) {
                sup.park_mut().restart_retract = true;
                return false;
            }
            if !settled {
                tracing::warn!(
                    rpm,
                    timeout_sec = timeout,
                    "spindle did not confirm at-speed before restore timeout; proceeding anyway"
                );
            }
        } else {
            let delay = sup.config().door_delay.spindle_delay_sec;
            env.delay
                .delay_sec(delay, &mut || env.events.peek().contains(RtExec::SAFETY_DOOR));
            if env.events.peek().contains(RtExec::SAFETY_DOOR) {
                sup.park_mut().restart_retract = true;
                return false;
            }
        }
        env.report
            .feedback_message(cnc_supervisor_common::collaborators::FeedbackMessage::SpindleRestore);
    }

    if !condition.coolant_modal.is_empty() {
        env.coolant.set_state(condition.coolant_modal);

        let delay = sup.config().door_delay.coolant_delay_sec;
        env.delay
            .delay_sec(delay, &mut || env.events.peek().contains(RtExec::SAFETY_DOOR));

        if env.events.peek().contains(RtExec::SAFETY_DOOR) {
            sup.park_mut().restart_retract = true;
            return false;
        }
    }

    true
}
