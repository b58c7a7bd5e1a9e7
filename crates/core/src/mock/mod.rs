//! Simulated chassis rig for host tests.
//!
//! A single [`SimState`] behind a `RefCell` is shared by thin per-device
//! views ([`SimMotors`], [`SimGyro`], [`SimLight`], [`SimClock`]) so one rig
//! can fill every slot of a [`DriveContext`](crate::drivebase::DriveContext)
//! without aliasing.
//!
//! Physics is deliberately crude: each `drive()` command advances the world
//! by one fixed tick — heading integrates the commanded turn rate, odometry
//! the commanded forward speed, and the clock moves `tick_ms` forward. That
//! is exactly the feedback the control loops need to be exercised
//! deterministically. Always available, not test-gated, so downstream crates
//! can reuse it.

use core::cell::RefCell;

use heapless::Vec;

use crate::drivebase::line::LINE_SETPOINT;
use crate::gyro::GyroSensor;
use crate::light::LightSensor;
use crate::motor::MotorPair;
use crate::traits::Clock;

/// Capacity of the recorded command log.
pub const DRIVE_LOG_CAP: usize = 1024;
/// Capacity of the scripted reflectance sequence.
pub const LIGHT_SCRIPT_CAP: usize = 64;

/// Shared world state of the simulated chassis.
#[derive(Debug)]
pub struct SimState {
    /// Milliseconds of world time consumed per drive command
    pub tick_ms: u64,
    /// Simulated clock in ms
    pub now_ms: u64,
    /// True heading in degrees (equals the raw gyro reading)
    pub heading_deg: f32,
    /// Signed odometry in mm since the last reset
    pub distance_mm: f32,
    /// Number of `drive` commands issued
    pub drive_calls: u32,
    /// Number of `stop` commands issued
    pub stop_calls: u32,
    /// Most recent `(forward, turn_rate)` command
    pub last_command: Option<(f32, f32)>,
    /// Every `(forward, turn_rate)` command, in order (saturating)
    pub drive_log: Vec<(f32, f32), DRIVE_LOG_CAP>,
    light_script: Vec<f32, LIGHT_SCRIPT_CAP>,
    light_cursor: usize,
}

impl SimState {
    /// Fresh world at time zero, heading zero, odometry zero.
    pub fn new(tick_ms: u64) -> Self {
        Self {
            tick_ms,
            now_ms: 0,
            heading_deg: 0.0,
            distance_mm: 0.0,
            drive_calls: 0,
            stop_calls: 0,
            last_command: None,
            drive_log: Vec::new(),
            light_script: Vec::new(),
            light_cursor: 0,
        }
    }

    /// Script the reflectance readings, one per sensor read.
    ///
    /// The final value repeats once the script runs out; an unscripted
    /// sensor always reads [`LINE_SETPOINT`].
    pub fn script_light(&mut self, readings: &[f32]) {
        self.light_script.clear();
        for &r in readings {
            let _ = self.light_script.push(r);
        }
        self.light_cursor = 0;
    }
}

/// Motor pair view: integrates commands into the shared world.
pub struct SimMotors<'a>(pub &'a RefCell<SimState>);

impl MotorPair for SimMotors<'_> {
    fn drive(&mut self, forward: f32, turn_rate: f32) {
        let mut s = self.0.borrow_mut();
        let dt = s.tick_ms as f32 / 1_000.0;
        s.heading_deg += turn_rate * dt;
        s.distance_mm += forward * dt;
        s.now_ms += s.tick_ms;
        s.drive_calls += 1;
        s.last_command = Some((forward, turn_rate));
        let _ = s.drive_log.push((forward, turn_rate));
    }

    fn distance(&mut self) -> f32 {
        self.0.borrow().distance_mm
    }

    fn reset_distance(&mut self) {
        self.0.borrow_mut().distance_mm = 0.0;
    }

    fn stop(&mut self) {
        let mut s = self.0.borrow_mut();
        s.stop_calls += 1;
        s.last_command = Some((0.0, 0.0));
    }
}

/// Gyro view: reads the world heading directly (multiplier 1 frame).
pub struct SimGyro<'a>(pub &'a RefCell<SimState>);

impl GyroSensor for SimGyro<'_> {
    fn raw_heading(&mut self) -> f32 {
        self.0.borrow().heading_deg
    }

    fn reset_heading(&mut self, heading: f32) {
        self.0.borrow_mut().heading_deg = heading;
    }
}

/// Reflectance view: replays the scripted readings.
pub struct SimLight<'a>(pub &'a RefCell<SimState>);

impl LightSensor for SimLight<'_> {
    fn read_intensity(&mut self) -> f32 {
        let mut s = self.0.borrow_mut();
        if s.light_script.is_empty() {
            return LINE_SETPOINT;
        }
        let idx = s.light_cursor.min(s.light_script.len() - 1);
        s.light_cursor += 1;
        s.light_script[idx]
    }
}

/// Clock view over the shared world time.
pub struct SimClock<'a>(pub &'a RefCell<SimState>);

impl Clock for SimClock<'_> {
    fn now_ms(&self) -> u64 {
        self.0.borrow().now_ms
    }
}
