//! In-place gyro turn.

use libm::roundf;

use super::task::ControlTask;
use super::DriveContext;

/// Default turn tolerance in degrees.
pub const DEFAULT_TURN_TOLERANCE_DEG: f32 = 1.0;
/// Default turn timeout in milliseconds.
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 4_000;

/// Parameters for [`TurnToHeading`].
#[derive(Debug, Clone, Copy)]
pub struct TurnParams {
    /// Target heading in degrees
    pub target: f32,
    /// Completion window: terminal when `|round(error)| < tolerance`
    pub tolerance: f32,
    /// Give-up time; expiry counts as completion
    pub timeout_ms: u64,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            target: 0.0,
            tolerance: DEFAULT_TURN_TOLERANCE_DEG,
            timeout_ms: DEFAULT_TURN_TIMEOUT_MS,
        }
    }
}

/// Rotates the robot on the spot to a gyro heading.
///
/// Zero forward speed; the turn rate follows the proportional-with-floor law
/// of [`turn_rate`](super::heading::turn_rate). Terminal when the rounded
/// error falls inside the tolerance or the timeout expires; the motors are
/// always stopped on the terminal tick.
#[derive(Debug)]
pub struct TurnToHeading {
    params: TurnParams,
    started_at: Option<u64>,
}

impl TurnToHeading {
    /// Build the task from explicit parameters.
    pub fn new(params: TurnParams) -> Self {
        Self {
            params,
            started_at: None,
        }
    }

    /// Build the task for `target` with default tolerance and timeout.
    pub fn to(target: f32) -> Self {
        Self::new(TurnParams {
            target,
            ..TurnParams::default()
        })
    }
}

impl ControlTask for TurnToHeading {
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool {
        let now = ctx.clock.now_ms();
        let started = *self.started_at.get_or_insert(now);

        let error = ctx.turn_error(self.params.target);
        let within = roundf(error).abs() < self.params.tolerance;
        if within || now.saturating_sub(started) >= self.params.timeout_ms {
            ctx.motors.stop();
            return false;
        }

        let rate = ctx.turn_rate_for(error);
        ctx.motors.drive(0.0, rate);
        true
    }
}
