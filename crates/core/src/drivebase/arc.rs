//! Constant-radius arc to a target heading.

use core::f32::consts::PI;

use libm::roundf;

use super::task::ControlTask;
use super::DriveContext;

/// Default arc cruise speed in mm/s.
pub const DEFAULT_ARC_SPEED: f32 = 100.0;
/// Default arc timeout in milliseconds.
pub const DEFAULT_ARC_TIMEOUT_MS: u64 = 10_000;

/// Parameters for [`MoveArc`].
#[derive(Debug, Clone, Copy)]
pub struct ArcParams {
    /// Arc radius in mm; the sign selects the turn direction
    pub radius: f32,
    /// Heading at which the arc ends, in degrees
    pub target: f32,
    /// Forward speed in mm/s
    pub speed: f32,
    /// Give-up time; expiry counts as completion
    pub timeout_ms: u64,
}

impl Default for ArcParams {
    fn default() -> Self {
        Self {
            radius: 0.0,
            target: 0.0,
            speed: DEFAULT_ARC_SPEED,
            timeout_ms: DEFAULT_ARC_TIMEOUT_MS,
        }
    }
}

/// Drives a circular arc until the gyro reaches the target heading.
///
/// The turn rate is fixed by geometry, `360·speed / (2π·radius)`, and the
/// completion window scales with speed: `tolerance = round(2·|speed|/100)`
/// degrees. Terminal on heading or timeout, stop issued on the terminal
/// tick.
#[derive(Debug)]
pub struct MoveArc {
    params: ArcParams,
    turn_rate: f32,
    tolerance: f32,
    started_at: Option<u64>,
}

impl MoveArc {
    /// Build the task, fixing turn rate and tolerance from the parameters.
    pub fn new(params: ArcParams) -> Self {
        let turn_rate = 360.0 * params.speed / (2.0 * PI * params.radius);
        let tolerance = roundf(2.0 * params.speed.abs() / 100.0);
        Self {
            params,
            turn_rate,
            tolerance,
            started_at: None,
        }
    }
}

impl ControlTask for MoveArc {
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool {
        let now = ctx.clock.now_ms();
        let started = *self.started_at.get_or_insert(now);

        let error = ctx.turn_error(self.params.target);
        let within = roundf(error).abs() < self.tolerance;
        if within || now.saturating_sub(started) >= self.params.timeout_ms {
            ctx.motors.stop();
            return false;
        }

        ctx.motors.drive(self.params.speed, self.turn_rate);
        true
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use super::*;
    use crate::drivebase::{DriveParams, Drivebase};
    use crate::mock::{SimClock, SimGyro, SimLight, SimMotors, SimState};

    fn base() -> Drivebase {
        Drivebase::new(DriveParams::default()).unwrap()
    }

    #[test]
    fn turn_rate_follows_arc_geometry() {
        let task = MoveArc::new(ArcParams {
            radius: 100.0,
            target: 90.0,
            speed: 100.0,
            ..ArcParams::default()
        });
        // 360·100 / (2π·100) = 180/π
        assert!((task.turn_rate - 180.0 / PI).abs() < 1e-3);
        assert_eq!(task.tolerance, 2.0);
    }

    #[test]
    fn negative_radius_reverses_turn_direction() {
        let task = MoveArc::new(ArcParams {
            radius: -100.0,
            target: -90.0,
            speed: 100.0,
            ..ArcParams::default()
        });
        assert!(task.turn_rate < 0.0);
    }

    #[test]
    fn arcs_until_target_heading() {
        let base = base();
        let state = RefCell::new(SimState::new(10));
        let mut motors = SimMotors(&state);
        let mut gyro = SimGyro(&state);
        let mut light = SimLight(&state);
        let clock = SimClock(&state);
        let mut ctx = DriveContext {
            motors: &mut motors,
            gyro: &mut gyro,
            light: &mut light,
            clock: &clock,
            base: &base,
        };

        let mut task = MoveArc::new(ArcParams {
            radius: 100.0,
            target: 90.0,
            speed: 100.0,
            ..ArcParams::default()
        });
        let mut ticks = 0;
        while task.step(&mut ctx) {
            ticks += 1;
            assert!(ticks < 5_000, "arc failed to terminate");
        }

        let s = state.borrow();
        // tolerance is 2°: the rounded error is inside the window
        assert!((s.heading_deg - 90.0).abs() < 2.5);
        assert!(s.distance_mm > 0.0, "arc did not translate");
        assert_eq!(s.stop_calls, 1);
        // the commanded setpoint is constant over the whole arc
        assert!(s
            .drive_log
            .iter()
            .all(|&(forward, _)| forward == 100.0));
    }

    #[test]
    fn times_out_with_zero_speed() {
        let base = base();
        let state = RefCell::new(SimState::new(10));
        let mut motors = SimMotors(&state);
        let mut gyro = SimGyro(&state);
        let mut light = SimLight(&state);
        let clock = SimClock(&state);
        let mut ctx = DriveContext {
            motors: &mut motors,
            gyro: &mut gyro,
            light: &mut light,
            clock: &clock,
            base: &base,
        };

        // zero speed: zero turn rate and a zero-degree window that can
        // never be satisfied, so only the timeout terminates the task
        let mut task = MoveArc::new(ArcParams {
            radius: 100.0,
            target: 90.0,
            speed: 0.0,
            timeout_ms: 300,
        });
        while task.step(&mut ctx) {}

        let s = state.borrow();
        assert!(s.now_ms >= 300);
        assert!(s.heading_deg.abs() < 1e-3);
        assert_eq!(s.stop_calls, 1);
    }
}
