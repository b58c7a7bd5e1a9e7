//! PID line following on a reflectance sensor.

use crate::light::LightSensor;

use super::task::ControlTask;
use super::DriveContext;

/// Reflectance setpoint the controller regulates against — the edge of the
/// line, halfway between tape and mat.
pub const LINE_SETPOINT: f32 = 60.0;
/// Default line-follow speed in mm/s.
pub const DEFAULT_LINE_SPEED: f32 = 250.0;
/// Default proportional gain.
pub const DEFAULT_LINE_KP: f32 = 1.2;
/// Default integral gain.
pub const DEFAULT_LINE_KI: f32 = 0.0;
/// Default derivative gain.
pub const DEFAULT_LINE_KD: f32 = 10.0;

/// Parameters for [`LineFollow`].
#[derive(Debug, Clone, Copy)]
pub struct LineParams {
    /// Distance to follow in mm; the only termination condition
    pub distance: f32,
    /// Cruise speed cap in mm/s
    pub speed: f32,
    /// `+1.0` or `-1.0`: which edge of the line is tracked
    pub side: f32,
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
}

impl Default for LineParams {
    fn default() -> Self {
        Self {
            distance: 0.0,
            speed: DEFAULT_LINE_SPEED,
            side: 1.0,
            kp: DEFAULT_LINE_KP,
            ki: DEFAULT_LINE_KI,
            kd: DEFAULT_LINE_KD,
        }
    }
}

#[derive(Debug, Default)]
struct Pid {
    last_error: f32,
    integral: f32,
}

/// Follows a line edge for a fixed distance.
///
/// Setpoint-60 PID on reflected light intensity with the recurrences the
/// tuned gains depend on, kept exactly as the competition constants expect:
///
/// - derivative is the raw per-tick difference `error − last_error`
/// - the integral leaks: `integral = integral/2 + error`, not a running sum
///
/// Both are sample-rate dependent by construction; do not normalize them to
/// a time-integrated controller. Terminal purely on distance — there is no
/// timeout.
#[derive(Debug)]
pub struct LineFollow {
    params: LineParams,
    pid: Option<Pid>,
}

impl LineFollow {
    /// Build the task from explicit parameters.
    pub fn new(params: LineParams) -> Self {
        Self { params, pid: None }
    }
}

/// One PID update; returns the unscaled turn rate.
fn pid_turn(pid: &mut Pid, params: &LineParams, sensor: &mut dyn LightSensor) -> f32 {
    let error = LINE_SETPOINT - sensor.read_intensity();
    let derivative = error - pid.last_error;
    pid.last_error = error;
    pid.integral = pid.integral / 2.0 + error;
    error * params.kp + derivative * params.kd + pid.integral * params.ki
}

impl ControlTask for LineFollow {
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool {
        if self.pid.is_none() {
            ctx.motors.reset_distance();
        }
        let pid = self.pid.get_or_insert_with(Pid::default);

        let traveled = ctx.motors.distance().abs();
        if traveled >= self.params.distance {
            ctx.motors.stop();
            return false;
        }

        let turn = pid_turn(pid, &self.params, ctx.light);
        let forward = ctx
            .base
            .profile()
            .ramp_speed(self.params.distance, traveled, self.params.speed);
        ctx.motors.drive(forward, turn * self.params.side);
        true
    }
}
