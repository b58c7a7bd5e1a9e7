//! Operator mission selection.
//!
//! The console itself (matrix display, buttons, speaker) is an external
//! collaborator behind the [`Console`] trait; this module owns the selection
//! state machine recovered from the hub menu: left/right move the cursor
//! with wraparound, the page key cycles pages, select launches the chosen
//! mission through the executor.

use bitflags::bitflags;

use crate::drivebase::DriveContext;
use crate::mission::{Mission, MissionError, MissionPage, MissionRunner, RunOutcome};
use crate::traits::CancelSignal;

/// Delay between idle console polls, in ms (UI responsiveness only; motion
/// ticks inside a running mission are never delayed).
pub const IDLE_POLL_MS: u32 = 50;
/// Debounce delay after a recognized press, in ms.
pub const NAV_DEBOUNCE_MS: u32 = 200;

bitflags! {
    /// Console buttons, reported as a set per poll.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buttons: u8 {
        /// Move the selection backwards
        const LEFT = 1 << 0;
        /// Move the selection forwards
        const RIGHT = 1 << 1;
        /// Launch the selected mission
        const SELECT = 1 << 2;
        /// Cycle to the next page
        const PAGE = 1 << 3;
    }
}

/// Display/button/speaker console capability.
pub trait Console {
    /// Buttons currently held down.
    fn buttons(&mut self) -> Buttons;

    /// Show the cursor for the given page and selection index.
    fn render_selection(&mut self, page: usize, index: usize);

    /// Blank the display while a press is handled.
    fn display_off(&mut self);

    /// Acknowledge a press audibly.
    fn beep(&mut self);
}

/// What a button set did to the menu.
#[derive(Debug, Clone, Copy)]
pub enum MenuEvent {
    /// No single button pressed; nothing changed.
    Idle,
    /// The selection moved within the page.
    SelectionChanged,
    /// The page changed; selection reset to the first mission.
    PageChanged,
    /// The selected mission should run.
    Launch(&'static Mission),
}

/// Outcome of one console poll, with the pacing the caller should apply.
#[derive(Debug, Clone, Copy)]
pub enum MenuPoll {
    /// Nothing happened; wait [`IDLE_POLL_MS`] before polling again.
    Idle,
    /// Navigation handled; wait [`NAV_DEBOUNCE_MS`] before polling again.
    Navigated,
    /// Run this mission, then resume polling.
    Launch(&'static Mission),
}

/// Mission selection state over static pages.
#[derive(Debug)]
pub struct MissionMenu {
    pages: &'static [MissionPage],
    page: usize,
    index: usize,
}

impl MissionMenu {
    /// Build the menu, validating every mission up front.
    ///
    /// Composition errors (oversized parallel sets, empty pages) are
    /// rejected here, before anything can run.
    pub fn new(pages: &'static [MissionPage]) -> Result<Self, MissionError> {
        for (i, page) in pages.iter().enumerate() {
            if page.is_empty() {
                return Err(MissionError::EmptyPage { page: i });
            }
            for mission in *page {
                mission.validate()?;
            }
        }
        Ok(Self {
            pages,
            page: 0,
            index: 0,
        })
    }

    /// Current page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Current selection index within the page.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The mission the cursor is on.
    pub fn selected(&self) -> &'static Mission {
        &self.pages[self.page][self.index]
    }

    /// Apply one button set to the selection state.
    ///
    /// Anything other than exactly one pressed button is ignored.
    pub fn handle(&mut self, buttons: Buttons) -> MenuEvent {
        if buttons.bits().count_ones() != 1 {
            return MenuEvent::Idle;
        }

        let page_len = self.pages[self.page].len();
        if buttons.contains(Buttons::LEFT) {
            self.index = if self.index == 0 {
                page_len - 1
            } else {
                self.index - 1
            };
            MenuEvent::SelectionChanged
        } else if buttons.contains(Buttons::RIGHT) {
            self.index += 1;
            if self.index >= page_len {
                self.index = 0;
            }
            MenuEvent::SelectionChanged
        } else if buttons.contains(Buttons::PAGE) {
            self.page = (self.page + 1) % self.pages.len();
            self.index = 0;
            MenuEvent::PageChanged
        } else {
            MenuEvent::Launch(self.selected())
        }
    }

    /// One console service iteration: read buttons, acknowledge, re-render.
    pub fn poll<C: Console>(&mut self, console: &mut C) -> MenuPoll {
        let buttons = console.buttons();
        match self.handle(buttons) {
            MenuEvent::Idle => {
                console.render_selection(self.page, self.index);
                MenuPoll::Idle
            }
            MenuEvent::Launch(mission) => {
                console.display_off();
                console.beep();
                MenuPoll::Launch(mission)
            }
            MenuEvent::SelectionChanged | MenuEvent::PageChanged => {
                console.display_off();
                console.beep();
                console.render_selection(self.page, self.index);
                MenuPoll::Navigated
            }
        }
    }

    /// Run a mission and report back, stopping the motors afterwards
    /// whatever the outcome.
    pub fn launch(
        &self,
        mission: &Mission,
        ctx: &mut DriveContext<'_>,
        cancel: &dyn CancelSignal,
    ) -> RunOutcome {
        let outcome = MissionRunner::new(cancel).run(mission, ctx);
        ctx.motors.stop();
        outcome
    }
}
