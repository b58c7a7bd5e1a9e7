//! Drivebase: speed profile, heading model and motion primitives.
//!
//! The [`Drivebase`] is built once from [`DriveParams`] and is immutable
//! afterwards. It carries the precomputed [`SpeedProfile`] and the gyro
//! calibration, and hands both to the motion primitives through a
//! [`DriveContext`] — the explicit bundle of motors, sensors and clock that
//! replaces any process-wide hardware state.
//!
//! # Primitives
//!
//! - [`TurnToHeading`]: rotate in place to a gyro heading
//! - [`MoveDistance`]: ramped straight move with closed-loop heading hold
//! - [`MoveArc`]: constant-radius arc to a target heading
//! - [`LineFollow`]: PID edge follow on a reflectance sensor
//! - [`Hold`]: timed station-keep
//!
//! Each is a resumable [`ControlTask`]: one control iteration per
//! [`step`](ControlTask::step), `false` on the terminal tick after issuing a
//! stop. A finished task must not be stepped again.

pub mod arc;
pub mod heading;
pub mod hold;
pub mod line;
pub mod profile;
pub mod straight;
pub mod task;
pub mod turn;

pub use arc::{ArcParams, MoveArc};
pub use hold::Hold;
pub use line::{LineFollow, LineParams};
pub use profile::{SpeedProfile, SPEED_TABLE_CAP};
pub use straight::{MoveDistance, MoveParams};
pub use task::{ControlTask, MotionTask};
pub use turn::{TurnParams, TurnToHeading};

use core::fmt;

use libm::roundf;

use crate::gyro::GyroSensor;
use crate::light::LightSensor;
use crate::motor::MotorPair;
use crate::traits::Clock;

/// Errors raised while constructing drive components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveError {
    /// Ramp-table discriminant went negative at the given index.
    Domain {
        /// First table index with a negative discriminant
        index: usize,
    },
    /// Requested ramp table exceeds [`SPEED_TABLE_CAP`].
    TableOverflow {
        /// Requested table length
        requested: usize,
    },
    /// A parameter was rejected outright.
    InvalidParameter {
        /// Human-readable reason
        reason: &'static str,
    },
}

impl fmt::Display for DriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveError::Domain { index } => {
                write!(f, "Speed table discriminant negative at index {}", index)
            }
            DriveError::TableOverflow { requested } => {
                write!(
                    f,
                    "Speed table length {} exceeds capacity {}",
                    requested, SPEED_TABLE_CAP
                )
            }
            DriveError::InvalidParameter { reason } => {
                write!(f, "Invalid drive parameter: {}", reason)
            }
        }
    }
}

/// Static drive configuration, fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct DriveParams {
    /// Ramp acceleration in mm/s² for the speed table
    pub acceleration: f32,
    /// Speed at zero ramp distance in mm/s
    pub start_speed: f32,
    /// Number of precomputed ramp entries (≤ [`SPEED_TABLE_CAP`])
    pub speed_table_len: usize,
    /// Turn-rate floor in deg/s
    pub turn_speed_min: f32,
    /// Turn rate at full (180°) error in deg/s
    pub turn_speed_max: f32,
    /// Heading-hold correction gain in (deg/s)/deg for straight moves
    pub turn_correction_gain: f32,
    /// Gyro calibration multiplier (calibrated = raw · multiplier)
    pub gyro_multiplier: f32,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            acceleration: 180.0,
            start_speed: 50.0,
            speed_table_len: 600,
            turn_speed_min: 40.0,
            turn_speed_max: 300.0,
            turn_correction_gain: 2.0,
            gyro_multiplier: 1.0,
        }
    }
}

/// Immutable drivebase façade: parameters plus the precomputed ramp table.
#[derive(Debug, Clone)]
pub struct Drivebase {
    params: DriveParams,
    profile: SpeedProfile,
}

impl Drivebase {
    /// Build the drivebase, precomputing the speed profile.
    pub fn new(params: DriveParams) -> Result<Self, DriveError> {
        let profile = SpeedProfile::build(
            params.acceleration,
            params.start_speed,
            params.speed_table_len,
        )?;
        Ok(Self { params, profile })
    }

    /// Drive configuration.
    pub fn params(&self) -> &DriveParams {
        &self.params
    }

    /// Precomputed ramp table.
    pub fn profile(&self) -> &SpeedProfile {
        &self.profile
    }

    /// Calibrated heading in (-180, 180].
    pub fn heading(&self, gyro: &mut dyn GyroSensor) -> f32 {
        heading::normalize_angle(gyro.raw_heading() * self.params.gyro_multiplier)
    }

    /// Overwrite the calibrated heading.
    ///
    /// The written raw value is rounded in the sensor frame, matching the
    /// integer accumulator of the hub gyro.
    pub fn set_heading(&self, gyro: &mut dyn GyroSensor, angle: f32) {
        gyro.reset_heading(roundf(angle / self.params.gyro_multiplier));
    }
}

/// Everything a motion primitive may touch during one tick.
///
/// Built fresh by the caller for each mission run; the devices are shared
/// mutable resources read and written once per tick by whichever task
/// currently holds the executor's attention.
pub struct DriveContext<'a> {
    /// Differential motor pair
    pub motors: &'a mut dyn MotorPair,
    /// Heading gyro
    pub gyro: &'a mut dyn GyroSensor,
    /// Reflectance sensor for line following
    pub light: &'a mut dyn LightSensor,
    /// Millisecond clock for timeouts
    pub clock: &'a dyn Clock,
    /// Immutable drive configuration and ramp table
    pub base: &'a Drivebase,
}

impl DriveContext<'_> {
    /// Calibrated heading in (-180, 180].
    pub fn heading(&mut self) -> f32 {
        self.base.heading(self.gyro)
    }

    /// Shortest signed rotation from the current heading to `target`.
    pub fn turn_error(&mut self, target: f32) -> f32 {
        let current = self.heading();
        heading::turn_error(target, current)
    }

    /// Turn-rate law evaluated with the configured floor and maximum.
    pub fn turn_rate_for(&self, error: f32) -> f32 {
        heading::turn_rate(
            error,
            self.base.params.turn_speed_min,
            self.base.params.turn_speed_max,
        )
    }

    /// Unsigned odometry since the last reset.
    pub fn traveled(&mut self) -> f32 {
        self.motors.distance().abs()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use core::cell::RefCell;

    use super::*;
    use crate::mock::{SimGyro, SimState};

    #[test]
    fn heading_applies_multiplier_and_normalizes() {
        let base = Drivebase::new(DriveParams {
            gyro_multiplier: 2.0,
            ..DriveParams::default()
        })
        .unwrap();
        let state = RefCell::new(SimState::new(10));
        let mut gyro = SimGyro(&state);

        gyro.reset_heading(45.0);
        assert!((base.heading(&mut gyro) - 90.0).abs() < 1e-4);

        // 2 · 100 = 200 wraps to -160
        gyro.reset_heading(100.0);
        assert!((base.heading(&mut gyro) - (-160.0)).abs() < 1e-4);
    }

    #[test]
    fn set_heading_rounds_in_sensor_frame() {
        let base = Drivebase::new(DriveParams {
            gyro_multiplier: 3.0,
            ..DriveParams::default()
        })
        .unwrap();
        let state = RefCell::new(SimState::new(10));
        let mut gyro = SimGyro(&state);

        // 100 / 3 = 33.33.. rounds to 33 in the raw frame
        base.set_heading(&mut gyro, 100.0);
        assert_eq!(gyro.raw_heading(), 33.0);
    }

    #[test]
    fn construction_propagates_profile_errors() {
        let err = Drivebase::new(DriveParams {
            acceleration: -1.0,
            start_speed: 0.0,
            ..DriveParams::default()
        })
        .unwrap_err();
        assert!(matches!(err, DriveError::Domain { .. }));
    }

    #[test]
    fn drive_error_display() {
        let err = DriveError::InvalidParameter {
            reason: "negative speed",
        };
        assert_eq!(err.to_string(), "Invalid drive parameter: negative speed");
    }
}
