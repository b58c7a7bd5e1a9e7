//! Demo mission pages for the simulator.
//!
//! Two console pages of statically composed missions, exercising every
//! mission-step variant the executor knows.

use brick_trail_core::drivebase::{ArcParams, LineParams, MotionTask, MoveParams, TurnParams};
use brick_trail_core::mission::{Mission, MissionPage, MissionStep, MotionFactory};

fn leg_300() -> MotionTask {
    MotionTask::straight(MoveParams {
        distance: 300.0,
        speed: 400.0,
        ..MoveParams::default()
    })
}

fn turn_90() -> MotionTask {
    MotionTask::turn_to(TurnParams {
        target: 90.0,
        ..TurnParams::default()
    })
}

fn turn_180() -> MotionTask {
    MotionTask::turn_to(TurnParams {
        target: 180.0,
        ..TurnParams::default()
    })
}

fn turn_270() -> MotionTask {
    MotionTask::turn_to(TurnParams {
        target: 270.0,
        ..TurnParams::default()
    })
}

fn turn_home() -> MotionTask {
    MotionTask::turn_to(TurnParams {
        target: 0.0,
        ..TurnParams::default()
    })
}

fn sprint_out() -> MotionTask {
    // full speed off the line: no ramp-up, ramped braking at the far end
    MotionTask::straight(MoveParams {
        distance: 600.0,
        speed: 600.0,
        ramp_up: false,
        ..MoveParams::default()
    })
}

fn sprint_back() -> MotionTask {
    MotionTask::straight(MoveParams {
        distance: 600.0,
        speed: 600.0,
        heading: Some(180.0),
        ..MoveParams::default()
    })
}

fn sweep_out() -> MotionTask {
    MotionTask::arc(ArcParams {
        radius: 200.0,
        target: 90.0,
        speed: 150.0,
        ..ArcParams::default()
    })
}

fn sweep_back() -> MotionTask {
    MotionTask::arc(ArcParams {
        radius: -200.0,
        target: 0.0,
        speed: 150.0,
        ..ArcParams::default()
    })
}

fn follow_line() -> MotionTask {
    MotionTask::line(LineParams {
        distance: 400.0,
        speed: 200.0,
        ..LineParams::default()
    })
}

fn settle() -> MotionTask {
    MotionTask::hold(250)
}

fn announce_start() {
    log::info!("mission started");
}

fn zero_heading(ctx: &mut brick_trail_core::drivebase::DriveContext<'_>) {
    let base = ctx.base;
    base.set_heading(ctx.gyro, 0.0);
    log::info!("heading zeroed");
}

static SQUARE: [MissionStep; 9] = [
    MissionStep::Action(announce_start),
    MissionStep::Motion(leg_300),
    MissionStep::Motion(turn_90),
    MissionStep::Motion(leg_300),
    MissionStep::Motion(turn_180),
    MissionStep::Motion(leg_300),
    MissionStep::Motion(turn_270),
    MissionStep::Motion(leg_300),
    MissionStep::Motion(turn_home),
];

static SPRINT: [MissionStep; 4] = [
    MissionStep::Motion(sprint_out),
    MissionStep::Motion(settle),
    MissionStep::Motion(sprint_back),
    MissionStep::Motion(turn_home),
];

static SWEEP: [MissionStep; 2] = [MissionStep::Motion(sweep_out), MissionStep::Motion(sweep_back)];

static LINE_RUN: [MissionStep; 2] = [
    MissionStep::Motion(follow_line),
    MissionStep::Motion(settle),
];

static SETTLE_PAIR: [MotionFactory; 2] = [settle, settle];

static CALIBRATE: [MissionStep; 3] = [
    MissionStep::ActionWith(zero_heading),
    MissionStep::Sequence(&[MissionStep::Motion(settle)]),
    MissionStep::Parallel(&SETTLE_PAIR),
];

static PAGE_RUNS: &[Mission] = &[
    Mission {
        name: "square",
        steps: &SQUARE,
    },
    Mission {
        name: "sprint",
        steps: &SPRINT,
    },
    Mission {
        name: "sweep",
        steps: &SWEEP,
    },
    Mission {
        name: "line",
        steps: &LINE_RUN,
    },
];

static PAGE_SERVICE: &[Mission] = &[Mission {
    name: "calibrate",
    steps: &CALIBRATE,
}];

/// The demo console pages.
pub static PAGES: &[MissionPage] = &[PAGE_RUNS, PAGE_SERVICE];

/// Look a mission up by name across all pages.
pub fn find(name: &str) -> Option<&'static Mission> {
    PAGES
        .iter()
        .flat_map(|page| page.iter())
        .find(|mission| mission.name == name)
}

/// All mission names, in menu order.
pub fn names() -> Vec<&'static str> {
    PAGES
        .iter()
        .flat_map(|page| page.iter())
        .map(|mission| mission.name)
        .collect()
}
