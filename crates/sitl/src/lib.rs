//! brick_trail_sitl - Software-in-the-loop harness for brick_trail.
//!
//! Runs whole missions against a simulated chassis on the host: the
//! kinematics are integrated per control tick, pose and commands are
//! traced through the `log` facade, and the demo mission pages exercise
//! every mission-step variant. The `mission_runner` binary drives it from
//! the command line.

pub mod error;
pub mod missions;
pub mod platform;

pub use error::SimError;
pub use platform::{SitlChassis, SitlClock};
