//! Reflected-light sensor abstraction.

/// Downward-facing reflectance sensor used for line following.
pub trait LightSensor {
    /// Reflected light intensity, nominally 0 (mat) to 100 (white tape).
    ///
    /// The line follower regulates against the fixed edge setpoint
    /// [`LINE_SETPOINT`](crate::drivebase::line::LINE_SETPOINT).
    fn read_intensity(&mut self) -> f32;
}
