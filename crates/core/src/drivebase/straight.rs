//! Ramped straight move with closed-loop heading hold.

use super::heading::sign;
use super::task::ControlTask;
use super::turn::TurnToHeading;
use super::DriveContext;

/// Default cruise speed in mm/s.
pub const DEFAULT_MOVE_SPEED: f32 = 500.0;
/// Initial heading error above which a pre-turn is inserted, in degrees.
pub const PRE_TURN_ERROR_DEG: f32 = 5.0;

/// Parameters for [`MoveDistance`].
#[derive(Debug, Clone, Copy)]
pub struct MoveParams {
    /// Signed distance in mm; the sign selects the travel direction
    pub distance: f32,
    /// Cruise speed cap in mm/s, must be non-negative
    pub speed: f32,
    /// Heading to hold; `None` locks to the heading read at start
    pub heading: Option<f32>,
    /// Pre-turn toward an explicit heading before moving
    pub turn: bool,
    /// Ramp the first half of the move (full speed when disabled)
    pub ramp_up: bool,
    /// Ramp the second half of the move
    pub ramp_down: bool,
    /// Give-up time; `None` derives it from distance and peak ramp speed
    pub timeout_ms: Option<u64>,
}

impl Default for MoveParams {
    fn default() -> Self {
        Self {
            distance: 0.0,
            speed: DEFAULT_MOVE_SPEED,
            heading: None,
            turn: true,
            ramp_up: true,
            ramp_down: true,
            timeout_ms: None,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Start,
    PreTurn { heading: f32, turn: TurnToHeading },
    Cruise(Cruise),
}

#[derive(Debug)]
struct Cruise {
    heading: f32,
    distance: f32,
    timeout_ms: f32,
    started_at: u64,
}

/// Moves the robot in a straight line for a given distance on a given
/// heading.
///
/// The forward command follows the symmetric ramp of the speed profile
/// (unless a ramp flag disables it for that half of the move); the turn
/// command holds the locked heading closed-loop. A negative speed is an
/// invalid parameter: the task stops the motors on its first tick and
/// finishes without moving.
///
/// When an explicit heading is requested with `turn` enabled and the initial
/// error exceeds [`PRE_TURN_ERROR_DEG`], a [`TurnToHeading`] sub-task runs
/// first and is drained to completion — one sub-task tick per outer tick —
/// before odometry is reset and the straight phase begins. Exactly one
/// actuator command is issued per tick throughout.
#[derive(Debug)]
pub struct MoveDistance {
    params: MoveParams,
    phase: Phase,
}

impl MoveDistance {
    /// Build the task from explicit parameters.
    pub fn new(params: MoveParams) -> Self {
        Self {
            params,
            phase: Phase::Start,
        }
    }

    /// Straight move of `distance` mm with defaults for everything else.
    pub fn by(distance: f32) -> Self {
        Self::new(MoveParams {
            distance,
            ..MoveParams::default()
        })
    }
}

/// Reset odometry, derive the timeout, and stamp the start of the straight
/// phase.
fn begin_cruise(params: &MoveParams, ctx: &mut DriveContext<'_>, heading: f32) -> Cruise {
    let distance = params.distance.abs();
    let timeout_ms = match params.timeout_ms {
        Some(ms) => ms as f32,
        None => {
            // twice the constant-peak-speed travel time, plus settling margin
            let peak = ctx.base.profile().peak(distance, params.speed);
            (distance / peak) * 2_000.0 + 500.0
        }
    };
    ctx.motors.reset_distance();
    Cruise {
        heading,
        distance,
        timeout_ms,
        started_at: ctx.clock.now_ms(),
    }
}

impl ControlTask for MoveDistance {
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool {
        loop {
            match &mut self.phase {
                Phase::Start => {
                    if self.params.speed < 0.0 {
                        ctx.motors.stop();
                        return false;
                    }
                    let heading = match self.params.heading {
                        Some(heading) => heading,
                        None => ctx.heading(),
                    };
                    let needs_turn = self.params.heading.is_some()
                        && self.params.turn
                        && ctx.turn_error(heading).abs() > PRE_TURN_ERROR_DEG;
                    self.phase = if needs_turn {
                        Phase::PreTurn {
                            heading,
                            turn: TurnToHeading::to(heading),
                        }
                    } else {
                        Phase::Cruise(begin_cruise(&self.params, ctx, heading))
                    };
                    // fall through to the phase just entered
                }
                Phase::PreTurn { heading, turn } => {
                    if turn.step(ctx) {
                        return true;
                    }
                    // the sub-task stopped the motors this tick; the straight
                    // phase starts on the next one
                    let heading = *heading;
                    let cruise = begin_cruise(&self.params, ctx, heading);
                    self.phase = Phase::Cruise(cruise);
                    return true;
                }
                Phase::Cruise(cruise) => {
                    let now = ctx.clock.now_ms();
                    let elapsed = now.saturating_sub(cruise.started_at) as f32;
                    if elapsed >= cruise.timeout_ms {
                        ctx.motors.stop();
                        return false;
                    }
                    let traveled = ctx.traveled();
                    if traveled >= cruise.distance {
                        ctx.motors.stop();
                        return false;
                    }

                    let half = cruise.distance / 2.0;
                    let forward = if !self.params.ramp_up && traveled < half {
                        self.params.speed
                    } else if !self.params.ramp_down && traveled > half {
                        self.params.speed
                    } else {
                        ctx.base
                            .profile()
                            .ramp_speed(cruise.distance, traveled, self.params.speed)
                    };
                    let heading = cruise.heading;
                    let correction =
                        ctx.turn_error(heading) * ctx.base.params().turn_correction_gain;
                    ctx.motors
                        .drive(forward * sign(self.params.distance), correction);
                    return true;
                }
            }
        }
    }
}
