//! Cooperative mission executor.
//!
//! Single-threaded and tick-driven: a resumable task performs one control
//! iteration per [`step`](ControlTask::step) call and yields back here.
//! Cancellation is polled once per tick, so it can only be observed at tick
//! boundaries — never mid-tick. Motion ticks run back-to-back with no
//! artificial delay.

use heapless::Vec;

use crate::drivebase::{ControlTask, DriveContext, MotionTask};
use crate::traits::CancelSignal;

use super::{Mission, MissionStep, MotionFactory, MAX_PARALLEL_TASKS};

/// How a mission run ended.
///
/// A primitive that hits its own timeout reports completion like any other
/// terminal tick; the executor does not distinguish the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step ran to its completion rule.
    Completed,
    /// The cancel signal fired; the remainder of the tree was skipped.
    Cancelled,
}

/// Drives mission trees against a cancel signal.
///
/// Cancellation, once observed, unwinds the entire current mission at every
/// nesting level. The executor issues no actuator commands of its own — the
/// stop a terminating primitive issues is the only cleanup; callers that
/// need the motors stopped after a cancelled run do it themselves (the menu
/// glue does).
pub struct MissionRunner<'a> {
    cancel: &'a dyn CancelSignal,
}

impl<'a> MissionRunner<'a> {
    /// New runner polling the given signal.
    pub fn new(cancel: &'a dyn CancelSignal) -> Self {
        Self { cancel }
    }

    /// Run a whole mission: its steps form the top-level sequence.
    pub fn run(&self, mission: &Mission, ctx: &mut DriveContext<'_>) -> RunOutcome {
        self.run_steps(mission.steps, ctx)
    }

    /// Run a single step to its completion rule.
    pub fn run_step(&self, step: &MissionStep, ctx: &mut DriveContext<'_>) -> RunOutcome {
        match step {
            MissionStep::Action(action) => {
                action();
                RunOutcome::Completed
            }
            MissionStep::ActionWith(action) => {
                action(ctx);
                RunOutcome::Completed
            }
            MissionStep::Motion(factory) => self.drive_task(factory(), ctx),
            MissionStep::Sequence(children) => self.run_steps(children, ctx),
            MissionStep::Parallel(factories) => self.drive_parallel(factories, ctx),
        }
    }

    fn run_steps(&self, steps: &[MissionStep], ctx: &mut DriveContext<'_>) -> RunOutcome {
        for step in steps {
            if self.cancel.is_requested() {
                return RunOutcome::Cancelled;
            }
            if self.run_step(step, ctx) == RunOutcome::Cancelled {
                return RunOutcome::Cancelled;
            }
        }
        RunOutcome::Completed
    }

    fn drive_task(&self, mut task: MotionTask, ctx: &mut DriveContext<'_>) -> RunOutcome {
        loop {
            if self.cancel.is_requested() {
                return RunOutcome::Cancelled;
            }
            if !task.step(ctx) {
                return RunOutcome::Completed;
            }
        }
    }

    fn drive_parallel(
        &self,
        factories: &[MotionFactory],
        ctx: &mut DriveContext<'_>,
    ) -> RunOutcome {
        debug_assert!(
            factories.len() <= MAX_PARALLEL_TASKS,
            "unvalidated parallel set"
        );
        let mut active: Vec<MotionTask, MAX_PARALLEL_TASKS> = Vec::new();
        for factory in factories.iter().take(MAX_PARALLEL_TASKS) {
            let _ = active.push(factory());
        }

        // remaining-count loop: each tick steps every still-active member
        // and drops the finished ones; order within the set is not part of
        // the contract, the last member to command the motors on a tick wins
        while !active.is_empty() {
            if self.cancel.is_requested() {
                return RunOutcome::Cancelled;
            }
            let mut i = 0;
            while i < active.len() {
                if active[i].step(ctx) {
                    i += 1;
                } else {
                    let _ = active.swap_remove(i);
                }
            }
        }
        RunOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use core::cell::{Cell, RefCell};
    use core::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::drivebase::{DriveParams, Drivebase, MoveParams};
    use crate::mock::{SimClock, SimGyro, SimLight, SimMotors, SimState};
    use crate::traits::{AbortFlag, NeverCancel};

    fn base() -> Drivebase {
        Drivebase::new(DriveParams {
            // flat 100 mm/s table: exactly 1 mm of travel per 10 ms tick
            acceleration: 0.0,
            start_speed: 100.0,
            ..DriveParams::default()
        })
        .unwrap()
    }

    macro_rules! ctx {
        ($ctx:ident, $state:expr, $base:expr) => {
            let mut motors = SimMotors(&$state);
            let mut gyro = SimGyro(&$state);
            let mut light = SimLight(&$state);
            let clock = SimClock(&$state);
            let mut $ctx = DriveContext {
                motors: &mut motors,
                gyro: &mut gyro,
                light: &mut light,
                clock: &clock,
                base: &$base,
            };
        };
    }

    /// Counts polls; fires after a fixed number of them.
    struct CancelAfter {
        polls: Cell<u32>,
        fire_at: u32,
    }

    impl CancelAfter {
        fn new(fire_at: u32) -> Self {
            Self {
                polls: Cell::new(0),
                fire_at,
            }
        }
    }

    impl CancelSignal for CancelAfter {
        fn is_requested(&self) -> bool {
            let n = self.polls.get() + 1;
            self.polls.set(n);
            n >= self.fire_at
        }
    }

    // straight moves with a flat speed table: lifespans in ticks are set by
    // the distance thresholds alone
    fn move_zero() -> MotionTask {
        MotionTask::straight(MoveParams {
            distance: 0.0,
            speed: 100.0,
            ..MoveParams::default()
        })
    }

    fn move_half_mm() -> MotionTask {
        MotionTask::straight(MoveParams {
            distance: 0.5,
            speed: 100.0,
            ..MoveParams::default()
        })
    }

    fn move_one_and_half_mm() -> MotionTask {
        MotionTask::straight(MoveParams {
            distance: 1.5,
            speed: 100.0,
            ..MoveParams::default()
        })
    }

    fn move_long() -> MotionTask {
        MotionTask::straight(MoveParams {
            distance: 10_000.0,
            speed: 100.0,
            ..MoveParams::default()
        })
    }

    #[test]
    fn atomic_action_invoked_exactly_once() {
        static CALLS: AtomicU32 = AtomicU32::new(0);
        fn bump() {
            CALLS.fetch_add(1, Ordering::Relaxed);
        }

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let runner = MissionRunner::new(&NeverCancel);
        let outcome = runner.run_step(&MissionStep::Action(bump), &mut ctx);

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(state.borrow().drive_calls, 0);
    }

    #[test]
    fn context_action_receives_the_context() {
        fn stop_motors(ctx: &mut DriveContext<'_>) {
            ctx.motors.stop();
        }

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let runner = MissionRunner::new(&NeverCancel);
        let outcome = runner.run_step(&MissionStep::ActionWith(stop_motors), &mut ctx);

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(state.borrow().stop_calls, 1);
    }

    #[test]
    fn sequence_runs_children_in_order() {
        static ORDER: AtomicU32 = AtomicU32::new(0);
        fn first() {
            // 0 -> 1 only if nothing ran before us
            let _ = ORDER.compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed);
        }
        fn second() {
            let _ = ORDER.compare_exchange(1, 2, Ordering::Relaxed, Ordering::Relaxed);
        }

        static STEPS: [MissionStep; 3] = [
            MissionStep::Action(first),
            MissionStep::Motion(move_half_mm),
            MissionStep::Action(second),
        ];
        let mission = Mission {
            name: "ordered",
            steps: &STEPS,
        };

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let runner = MissionRunner::new(&NeverCancel);
        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Completed);
        assert_eq!(ORDER.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn parallel_completes_in_longest_member_lifespan() {
        // lifespans 1, 2 and 3 ticks: the set needs exactly 3 executor
        // ticks, so the cancel signal is polled exactly 3 times
        static FACTORIES: [MotionFactory; 3] = [move_zero, move_half_mm, move_one_and_half_mm];
        static STEPS: [MissionStep; 1] = [MissionStep::Parallel(&FACTORIES)];
        let mission = Mission {
            name: "parallel",
            steps: &STEPS,
        };
        assert!(mission.validate().is_ok());

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let cancel = CancelAfter::new(u32::MAX);
        let runner = MissionRunner::new(&cancel);
        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Completed);

        // one poll from the sequence plus one per parallel tick
        assert_eq!(cancel.polls.get(), 1 + 3);
    }

    #[test]
    fn cancellation_before_first_step() {
        static STEPS: [MissionStep; 1] = [MissionStep::Motion(move_long)];
        let mission = Mission {
            name: "never-starts",
            steps: &STEPS,
        };

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let flag = AbortFlag::new();
        flag.request();
        let runner = MissionRunner::new(&flag);

        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Cancelled);
        assert_eq!(state.borrow().drive_calls, 0);
    }

    #[test]
    fn cancellation_mid_sequence_skips_remaining_steps() {
        static SECOND_STARTED: AtomicU32 = AtomicU32::new(0);
        fn second_leg() -> MotionTask {
            SECOND_STARTED.fetch_add(1, Ordering::Relaxed);
            move_long()
        }

        static STEPS: [MissionStep; 2] = [
            MissionStep::Motion(move_long),
            MissionStep::Motion(second_leg),
        ];
        let mission = Mission {
            name: "aborted",
            steps: &STEPS,
        };

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        // poll 1: sequence pre-check; poll 2: tick 1 of step 1; poll 3 fires
        let cancel = CancelAfter::new(3);
        let runner = MissionRunner::new(&cancel);

        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Cancelled);
        // step 1 received exactly one tick after cancellation was requested
        assert_eq!(state.borrow().drive_calls, 1);
        // step 2 was never even built
        assert_eq!(SECOND_STARTED.load(Ordering::Relaxed), 0);
        // the executor forced no cleanup of its own
        assert_eq!(state.borrow().stop_calls, 0);
    }

    #[test]
    fn cancellation_unwinds_nested_sequences() {
        static STEPS_INNER: [MissionStep; 1] = [MissionStep::Motion(move_long)];
        static STEPS: [MissionStep; 2] = [
            MissionStep::Sequence(&STEPS_INNER),
            MissionStep::Motion(move_long),
        ];
        let mission = Mission {
            name: "nested",
            steps: &STEPS,
        };

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let cancel = CancelAfter::new(4);
        let runner = MissionRunner::new(&cancel);
        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Cancelled);
    }

    #[test]
    fn parallel_cancellation_drops_all_members() {
        static FACTORIES: [MotionFactory; 2] = [move_long, move_long];
        static STEPS: [MissionStep; 1] = [MissionStep::Parallel(&FACTORIES)];
        let mission = Mission {
            name: "parallel-abort",
            steps: &STEPS,
        };

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        // poll 1: sequence; poll 2: parallel tick 1; poll 3 fires
        let cancel = CancelAfter::new(3);
        let runner = MissionRunner::new(&cancel);
        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Cancelled);

        // both members got exactly one tick
        assert_eq!(state.borrow().drive_calls, 2);
    }

    #[test]
    fn timeout_reads_as_completion() {
        fn stalled() -> MotionTask {
            MotionTask::straight(MoveParams {
                distance: 1_000.0,
                speed: 0.0,
                timeout_ms: Some(50),
                ..MoveParams::default()
            })
        }
        static AFTER: AtomicU32 = AtomicU32::new(0);
        fn after() {
            AFTER.fetch_add(1, Ordering::Relaxed);
        }

        static STEPS: [MissionStep; 2] =
            [MissionStep::Motion(stalled), MissionStep::Action(after)];
        let mission = Mission {
            name: "timeout",
            steps: &STEPS,
        };

        let base = base();
        let state = RefCell::new(SimState::new(10));
        ctx!(ctx, state, base);

        let runner = MissionRunner::new(&NeverCancel);
        assert_eq!(runner.run(&mission, &mut ctx), RunOutcome::Completed);
        // the mission proceeded past the timed-out step
        assert_eq!(AFTER.load(Ordering::Relaxed), 1);
    }
}
