//! Simulated chassis for SITL runs.
//!
//! [`SitlChassis`] integrates commanded kinematics into a planar pose
//! behind a shared mutex, advancing the shared [`SitlClock`] by one fixed
//! tick per drive command — the same tick-is-a-command rule the executor
//! enforces. Device views ([`SitlMotors`], [`SitlGyro`], [`SitlLight`])
//! borrow into the shared state so one chassis fills every slot of a
//! [`DriveContext`](brick_trail_core::drivebase::DriveContext).

pub mod clock;

pub use clock::SitlClock;

use std::sync::{Arc, Mutex};

use brick_trail_core::drivebase::line::LINE_SETPOINT;
use brick_trail_core::gyro::GyroSensor;
use brick_trail_core::light::LightSensor;
use brick_trail_core::motor::MotorPair;

/// Planar pose and odometry of the simulated robot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pose {
    /// X position in mm (east in the sim frame)
    pub x_mm: f32,
    /// Y position in mm (north in the sim frame)
    pub y_mm: f32,
    /// Heading in degrees, unwrapped
    pub heading_deg: f32,
}

#[derive(Debug, Default)]
struct ChassisState {
    pose: Pose,
    distance_mm: f32,
    total_distance_mm: f32,
    drive_calls: u64,
    stop_calls: u64,
    stopped: bool,
}

type ReflectanceModel = dyn Fn(f32) -> f32 + Send + Sync;

/// Simulated differential-drive chassis.
///
/// Clones share the same world; use [`motors`](SitlChassis::motors),
/// [`gyro`](SitlChassis::gyro) and [`light`](SitlChassis::light) to obtain
/// the per-device views the drive context needs.
#[derive(Clone)]
pub struct SitlChassis {
    state: Arc<Mutex<ChassisState>>,
    clock: SitlClock,
    tick_ms: u64,
    reflectance: Arc<ReflectanceModel>,
}

impl SitlChassis {
    /// New chassis at the origin, advancing `tick_ms` of sim time per
    /// drive command. The reflectance model reads the line-edge setpoint
    /// everywhere until replaced.
    pub fn new(tick_ms: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChassisState::default())),
            clock: SitlClock::new(),
            tick_ms,
            reflectance: Arc::new(|_| LINE_SETPOINT),
        }
    }

    /// Replace the reflectance model: total travelled distance in, reading
    /// out.
    pub fn with_reflectance<F>(mut self, model: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        self.reflectance = Arc::new(model);
        self
    }

    /// The shared simulated clock.
    pub fn clock(&self) -> SitlClock {
        self.clock.clone()
    }

    /// Motor pair view.
    pub fn motors(&self) -> SitlMotors {
        SitlMotors(self.clone())
    }

    /// Gyro view.
    pub fn gyro(&self) -> SitlGyro {
        SitlGyro(self.clone())
    }

    /// Reflectance sensor view.
    pub fn light(&self) -> SitlLight {
        SitlLight(self.clone())
    }

    /// Current pose.
    pub fn pose(&self) -> Pose {
        self.state.lock().unwrap().pose
    }

    /// Whether the last actuator command was a stop.
    pub fn is_stopped(&self) -> bool {
        self.state.lock().unwrap().stopped
    }

    /// Number of drive commands consumed.
    pub fn drive_calls(&self) -> u64 {
        self.state.lock().unwrap().drive_calls
    }

    fn integrate(&self, forward: f32, turn_rate: f32) {
        let mut s = self.state.lock().unwrap();
        let dt = self.tick_ms as f32 / 1_000.0;
        s.pose.heading_deg += turn_rate * dt;
        let heading_rad = s.pose.heading_deg.to_radians();
        let step = forward * dt;
        // heading 0 = +y, positive heading turns clockwise toward +x
        s.pose.x_mm += step * heading_rad.sin();
        s.pose.y_mm += step * heading_rad.cos();
        s.distance_mm += step;
        s.total_distance_mm += step.abs();
        s.drive_calls += 1;
        s.stopped = false;
        log::trace!(
            "drive fwd={forward:.1} turn={turn_rate:.1} -> pose ({:.1}, {:.1}, {:.1}°)",
            s.pose.x_mm,
            s.pose.y_mm,
            s.pose.heading_deg
        );
        drop(s);
        self.clock.advance(self.tick_ms);
    }
}

/// Motor pair view over a shared chassis.
pub struct SitlMotors(SitlChassis);

impl MotorPair for SitlMotors {
    fn drive(&mut self, forward: f32, turn_rate: f32) {
        self.0.integrate(forward, turn_rate);
    }

    fn distance(&mut self) -> f32 {
        self.0.state.lock().unwrap().distance_mm
    }

    fn reset_distance(&mut self) {
        self.0.state.lock().unwrap().distance_mm = 0.0;
    }

    fn stop(&mut self) {
        let mut s = self.0.state.lock().unwrap();
        s.stop_calls += 1;
        s.stopped = true;
        log::debug!(
            "stop at pose ({:.1}, {:.1}, {:.1}°) after {} drive commands",
            s.pose.x_mm,
            s.pose.y_mm,
            s.pose.heading_deg,
            s.drive_calls
        );
    }
}

/// Gyro view over a shared chassis.
pub struct SitlGyro(SitlChassis);

impl GyroSensor for SitlGyro {
    fn raw_heading(&mut self) -> f32 {
        self.0.state.lock().unwrap().pose.heading_deg
    }

    fn reset_heading(&mut self, heading: f32) {
        self.0.state.lock().unwrap().pose.heading_deg = heading;
    }
}

/// Reflectance sensor view over a shared chassis.
pub struct SitlLight(SitlChassis);

impl LightSensor for SitlLight {
    fn read_intensity(&mut self) -> f32 {
        let total = self.0.state.lock().unwrap().total_distance_mm;
        (self.0.reflectance)(total)
    }
}
