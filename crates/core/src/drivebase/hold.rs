//! Timed station-keep.

use super::task::ControlTask;
use super::DriveContext;

/// Holds the robot in place for a fixed duration.
///
/// Issues a zero drive command each tick so the heading controller in the
/// pair firmware keeps the wheels locked, then stops. Used to pace mission
/// trees between moves.
#[derive(Debug)]
pub struct Hold {
    duration_ms: u64,
    started_at: Option<u64>,
}

impl Hold {
    /// Hold for `duration_ms` milliseconds.
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            started_at: None,
        }
    }
}

impl ControlTask for Hold {
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool {
        let now = ctx.clock.now_ms();
        let started = *self.started_at.get_or_insert(now);
        if now.saturating_sub(started) >= self.duration_ms {
            ctx.motors.stop();
            return false;
        }
        ctx.motors.drive(0.0, 0.0);
        true
    }
}
