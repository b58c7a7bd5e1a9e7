//! Resumable control task contract.

use super::arc::{ArcParams, MoveArc};
use super::hold::Hold;
use super::line::{LineFollow, LineParams};
use super::straight::{MoveDistance, MoveParams};
use super::turn::{TurnParams, TurnToHeading};
use super::DriveContext;

/// A unit of resumable control work.
///
/// Created fresh from primitive parameters for every invocation; private
/// loop state (timers, PID accumulators) lives inside the implementor.
pub trait ControlTask {
    /// Perform exactly one control iteration.
    ///
    /// Reads sensors, issues at most one actuator command, and returns
    /// `true` while more steps are required. On the tick it returns `false`
    /// the task first issues a stop command. Stepping a finished task again
    /// is outside the contract — executors must not resume it.
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool;
}

/// Closed sum over the motion primitives.
///
/// Lets static mission trees name resumable work through plain `fn`
/// factories, without allocation or trait objects.
#[derive(Debug)]
pub enum MotionTask {
    /// Rotate in place to a heading
    Turn(TurnToHeading),
    /// Ramped straight move
    Straight(MoveDistance),
    /// Constant-radius arc
    Arc(MoveArc),
    /// PID line follow
    Line(LineFollow),
    /// Timed station-keep
    Hold(Hold),
}

impl MotionTask {
    /// In-place turn task.
    pub fn turn_to(params: TurnParams) -> Self {
        Self::Turn(TurnToHeading::new(params))
    }

    /// Straight-move task.
    pub fn straight(params: MoveParams) -> Self {
        Self::Straight(MoveDistance::new(params))
    }

    /// Arc task.
    pub fn arc(params: ArcParams) -> Self {
        Self::Arc(MoveArc::new(params))
    }

    /// Line-follow task.
    pub fn line(params: LineParams) -> Self {
        Self::Line(LineFollow::new(params))
    }

    /// Station-keep task.
    pub fn hold(duration_ms: u64) -> Self {
        Self::Hold(Hold::new(duration_ms))
    }
}

impl ControlTask for MotionTask {
    fn step(&mut self, ctx: &mut DriveContext<'_>) -> bool {
        match self {
            MotionTask::Turn(task) => task.step(ctx),
            MotionTask::Straight(task) => task.step(ctx),
            MotionTask::Arc(task) => task.step(ctx),
            MotionTask::Line(task) => task.step(ctx),
            MotionTask::Hold(task) => task.step(ctx),
        }
    }
}

impl From<TurnToHeading> for MotionTask {
    fn from(task: TurnToHeading) -> Self {
        Self::Turn(task)
    }
}

impl From<MoveDistance> for MotionTask {
    fn from(task: MoveDistance) -> Self {
        Self::Straight(task)
    }
}

impl From<MoveArc> for MotionTask {
    fn from(task: MoveArc) -> Self {
        Self::Arc(task)
    }
}

impl From<LineFollow> for MotionTask {
    fn from(task: LineFollow) -> Self {
        Self::Line(task)
    }
}

impl From<Hold> for MotionTask {
    fn from(task: Hold) -> Self {
        Self::Hold(task)
    }
}
