//! Demo main-loop harness: wires a [`cnc_supervisor_core::Supervisor`] up to
//! the in-memory mocks and drives it through a scripted operator session,
//! logging each transition as it happens.

use cnc_supervisor_common::config::SupervisorConfig;
use cnc_supervisor_common::events::{EventMailbox, RtExec};
use cnc_supervisor_core::{Env, Supervisor};
use cnc_supervisor_sim::config;
use cnc_supervisor_sim::mocks::{
    SimCoolant, SimDelay, SimGcode, SimHal, SimMotion, SimOverrides, SimPlanner, SimReport,
    SimSpindle, SimStepper,
};

fn main() {
    tracing_subscriber::fmt::init();

    let config = std::env::args()
        .nth(1)
        .and_then(|path| config::load(&path).ok())
        .unwrap_or_else(|| {
            tracing::info!("no config path given or load failed; using defaults");
            SupervisorConfig::default()
        });

    let mut supervisor = Supervisor::new(config);
    let mailbox = EventMailbox::new();

    let mut planner = SimPlanner {
        condition: cnc_supervisor_common::collaborators::BlockCondition::Active,
        ..Default::default()
    };
    let mut stepper = SimStepper::default();
    let mut spindle = SimSpindle {
        reaches_speed: true,
        ..Default::default()
    };
    let mut coolant = SimCoolant::default();
    let mut gcode = SimGcode::default();
    let mut hal = SimHal::default();
    let mut report = SimReport::default();
    let mut overrides = SimOverrides::default();
    let mut motion = SimMotion::default();
    let mut delay = SimDelay::default();

    let script = [
        RtExec::CYCLE_START,
        RtExec::empty(),
        RtExec::FEED_HOLD,
        RtExec::empty(),
        RtExec::CYCLE_START,
        RtExec::CYCLE_COMPLETE,
    ];

    for (tick, &posted) in script.iter().enumerate() {
        mailbox.post(posted);
        stepper.stopped = true; // the mock motion system settles within one tick
        let events = mailbox.take();
        let mut env = Env {
            planner: &mut planner,
            stepper: &mut stepper,
            spindle: &mut spindle,
            coolant: &mut coolant,
            gcode: &mut gcode,
            hal: &mut hal,
            report: &mut report,
            overrides: &mut overrides,
            motion: &mut motion,
            delay: &mut delay,
            events: &mailbox,
        };
        let state = supervisor.update(events, &mut env);
        tracing::info!(tick, ?events, ?state, "tick processed");
    }
}
