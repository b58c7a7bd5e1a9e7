//! Run a demo mission against the simulated chassis.
//!
//! ```text
//! mission_runner [--mission NAME] [--tick MS] [--list]
//! ```

use std::process;

use brick_trail_core::drivebase::{DriveContext, DriveParams, Drivebase};
use brick_trail_core::mission::{MissionRunner, RunOutcome};
use brick_trail_core::traits::{Clock, NeverCancel};
use brick_trail_sitl::missions;
use brick_trail_sitl::{SimError, SitlChassis};

struct Options {
    mission: String,
    tick_ms: u64,
    list: bool,
}

fn usage() {
    eprintln!(
        "Usage: mission_runner [OPTIONS]\n\
         \n\
         Options:\n\
           --mission NAME   Mission to run (default: square)\n\
           --tick MS        Sim milliseconds per control tick (default: 10)\n\
           --list           List available missions and exit\n\
           --help           Show this help"
    );
}

fn parse_args() -> Result<Options, SimError> {
    let mut options = Options {
        mission: String::from("square"),
        tick_ms: 10,
        list: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mission" => {
                options.mission = args.next().ok_or(SimError::InvalidArgument("mission"))?;
            }
            "--tick" => {
                let value = args.next().ok_or(SimError::InvalidArgument("tick"))?;
                options.tick_ms = value
                    .parse()
                    .map_err(|_| SimError::InvalidArgument("tick"))?;
                if options.tick_ms == 0 {
                    return Err(SimError::InvalidArgument("tick"));
                }
            }
            "--list" => options.list = true,
            "--help" | "-h" => {
                usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                usage();
                process::exit(2);
            }
        }
    }
    Ok(options)
}

fn run(options: &Options) -> Result<(), SimError> {
    let mission = missions::find(&options.mission)
        .ok_or_else(|| SimError::UnknownMission(options.mission.clone()))?;
    mission
        .validate()
        .map_err(|e| SimError::Composition(e.to_string()))?;

    let base =
        Drivebase::new(DriveParams::default()).map_err(|e| SimError::Drivebase(e.to_string()))?;
    let chassis = SitlChassis::new(options.tick_ms);
    let clock = chassis.clock();
    let mut motors = chassis.motors();
    let mut gyro = chassis.gyro();
    let mut light = chassis.light();
    let mut ctx = DriveContext {
        motors: &mut motors,
        gyro: &mut gyro,
        light: &mut light,
        clock: &clock,
        base: &base,
    };

    println!("=== brick_trail mission runner ===");
    println!(
        "mission: {}  tick: {} ms",
        mission.name, options.tick_ms
    );

    let runner = MissionRunner::new(&NeverCancel);
    let outcome = runner.run(mission, &mut ctx);
    ctx.motors.stop();

    let pose = chassis.pose();
    let elapsed = clock.now_ms();
    match outcome {
        RunOutcome::Completed => println!("outcome: completed in {elapsed} ms (sim)"),
        RunOutcome::Cancelled => println!("outcome: cancelled after {elapsed} ms (sim)"),
    }
    println!(
        "final pose: x {:.1} mm, y {:.1} mm, heading {:.1}°  ({} drive commands)",
        pose.x_mm,
        pose.y_mm,
        pose.heading_deg,
        chassis.drive_calls()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            usage();
            process::exit(2);
        }
    };

    if options.list {
        for name in missions::names() {
            println!("{name}");
        }
        return;
    }

    if let Err(e) = run(&options) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
