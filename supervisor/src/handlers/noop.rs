use crate::dispatcher::{Env, Supervisor};
use cnc_supervisor_common::events::RtExec;

/// `Homing`, `Alarm`, `EStop`, and `CheckMode` are owned by subsystems
/// outside the supervisor: the dispatcher still ticks through them each
/// cycle but takes no action of its own. `Sleep` is notably absent here —
/// it runs the same hold/park protocol as `SafetyDoor`.
pub(crate) fn run(_sup: &mut Supervisor, _events: RtExec, _env: &mut Env) -> Option<RtExec> {
    None
}
