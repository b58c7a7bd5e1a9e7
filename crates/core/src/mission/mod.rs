//! Static mission trees.
//!
//! A mission is an operator-selectable, statically composed tree of
//! [`MissionStep`]s, built once at startup and read-only afterwards. Steps
//! dispatch on their tag — there is no runtime probing of callables; a step
//! that fits no variant simply cannot be constructed.

pub mod executor;

pub use executor::{MissionRunner, RunOutcome};

use core::fmt;

use crate::drivebase::{DriveContext, MotionTask};

/// Maximum members of a [`MissionStep::Parallel`] set.
pub const MAX_PARALLEL_TASKS: usize = 8;

/// Factory producing a fresh resumable task per invocation.
///
/// Plain `fn` pointers keep mission trees `'static`-composable without
/// allocation; parameters are baked in at composition.
pub type MotionFactory = fn() -> MotionTask;

/// One node of a mission tree.
pub enum MissionStep {
    /// Invoked exactly once, no context.
    Action(fn()),
    /// Invoked exactly once with the shared hardware/configuration context.
    ActionWith(fn(&mut DriveContext<'_>)),
    /// Resumable motion, ticked until it signals completion.
    Motion(MotionFactory),
    /// Children run strictly in order, each to its own completion rule.
    Sequence(&'static [MissionStep]),
    /// One task per factory, interleaved on the single control thread until
    /// every member has finished.
    Parallel(&'static [MotionFactory]),
}

/// A named, statically composed mission.
pub struct Mission {
    /// Menu label
    pub name: &'static str,
    /// Top-level steps, run as a sequence
    pub steps: &'static [MissionStep],
}

impl fmt::Debug for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mission")
            .field("name", &self.name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

/// One console page of missions.
pub type MissionPage = &'static [Mission];

/// Mission composition errors, rejected before anything runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionError {
    /// A parallel set exceeds [`MAX_PARALLEL_TASKS`].
    ParallelOverflow {
        /// Mission containing the oversized set
        mission: &'static str,
        /// Number of factories in the set
        len: usize,
    },
    /// A menu page has no missions to select.
    EmptyPage {
        /// Index of the empty page
        page: usize,
    },
}

impl fmt::Display for MissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionError::ParallelOverflow { mission, len } => {
                write!(
                    f,
                    "Mission '{}': parallel set of {} exceeds {} tasks",
                    mission, len, MAX_PARALLEL_TASKS
                )
            }
            MissionError::EmptyPage { page } => {
                write!(f, "Menu page {} has no missions", page)
            }
        }
    }
}

impl Mission {
    /// Walk the tree and reject anything the executor could not run.
    pub fn validate(&self) -> Result<(), MissionError> {
        validate_steps(self.name, self.steps)
    }
}

fn validate_steps(mission: &'static str, steps: &[MissionStep]) -> Result<(), MissionError> {
    for step in steps {
        match step {
            MissionStep::Parallel(factories) if factories.len() > MAX_PARALLEL_TASKS => {
                return Err(MissionError::ParallelOverflow {
                    mission,
                    len: factories.len(),
                });
            }
            MissionStep::Sequence(children) => validate_steps(mission, children)?,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::string::ToString;

    use super::*;
    use crate::drivebase::MotionTask;

    fn hold() -> MotionTask {
        MotionTask::hold(10)
    }

    #[test]
    fn simple_mission_validates() {
        static STEPS: [MissionStep; 2] = [
            MissionStep::Motion(hold),
            MissionStep::Sequence(&[MissionStep::Motion(hold)]),
        ];
        let mission = Mission {
            name: "ok",
            steps: &STEPS,
        };
        assert!(mission.validate().is_ok());
    }

    #[test]
    fn oversized_parallel_rejected() {
        static WIDE: [MotionFactory; MAX_PARALLEL_TASKS + 1] = [hold; MAX_PARALLEL_TASKS + 1];
        static STEPS: [MissionStep; 1] = [MissionStep::Parallel(&WIDE)];
        let mission = Mission {
            name: "wide",
            steps: &STEPS,
        };
        assert_eq!(
            mission.validate(),
            Err(MissionError::ParallelOverflow {
                mission: "wide",
                len: MAX_PARALLEL_TASKS + 1,
            })
        );
    }

    #[test]
    fn nested_oversized_parallel_rejected() {
        static WIDE: [MotionFactory; MAX_PARALLEL_TASKS + 1] = [hold; MAX_PARALLEL_TASKS + 1];
        static INNER: [MissionStep; 1] = [MissionStep::Parallel(&WIDE)];
        static STEPS: [MissionStep; 1] = [MissionStep::Sequence(&INNER)];
        let mission = Mission {
            name: "nested",
            steps: &STEPS,
        };
        assert!(mission.validate().is_err());
    }

    #[test]
    fn mission_error_display() {
        let err = MissionError::EmptyPage { page: 1 };
        assert_eq!(err.to_string(), "Menu page 1 has no missions");
    }
}
