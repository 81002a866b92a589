//! Step-by-step quiz state machine.

use super::domain::{AnswerId, QuizSelection};

/// Input lock states for the navigator. Selection changes are only honored
/// while collecting; once a submission is in flight or the completion
/// celebration is showing, picks are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorPhase {
    Collecting,
    Submitting,
    Celebrating,
}

/// Result of an [`StepNavigator::advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the given step.
    Moved(usize),
    /// Already on the last step: the quiz is complete and the projected
    /// answer list is ready for the submission coordinator.
    Completed(SubmissionInput),
}

/// Ordered answer identifiers projected from the selection map, handed to
/// the submission coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionInput {
    pub answers: Vec<AnswerId>,
}

/// Completion-based progress reported to the UI: answered steps over total,
/// not the current position. The two diverge when a user revisits earlier
/// steps, and that divergence is intentional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

#[derive(Debug)]
pub struct StepNavigator {
    current_step: usize,
    total_steps: usize,
    selections: QuizSelection,
    phase: NavigatorPhase,
}

impl StepNavigator {
    /// Builds a navigator over a loaded catalog; `total_steps` is fixed for
    /// the lifetime of the quiz session.
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 0,
            total_steps,
            selections: QuizSelection::default(),
            phase: NavigatorPhase::Collecting,
        }
    }

    /// Records (or overwrites) the selection for a step. Returns whether the
    /// pick was accepted; picks are rejected outside the collecting phase
    /// and for steps beyond the catalog.
    pub fn select_answer(&mut self, step: usize, answer: AnswerId) -> bool {
        if self.phase != NavigatorPhase::Collecting || step >= self.total_steps {
            return false;
        }
        self.selections.record(step, answer);
        true
    }

    /// Moves forward one step, or yields the completed submission input when
    /// already on the last step. Completion locks further input.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.current_step + 1 < self.total_steps {
            self.current_step += 1;
            return AdvanceOutcome::Moved(self.current_step);
        }

        self.phase = NavigatorPhase::Submitting;
        AdvanceOutcome::Completed(SubmissionInput {
            answers: self.selections.project(),
        })
    }

    /// Moves back one step; no-op at the first step.
    pub fn retreat(&mut self) -> usize {
        if self.current_step > 0 {
            self.current_step -= 1;
        }
        self.current_step
    }

    /// Switches the lock from submitting to the celebration animation.
    pub fn begin_celebration(&mut self) {
        self.phase = NavigatorPhase::Celebrating;
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered: self.selections.answered(),
            total: self.total_steps,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn phase(&self) -> NavigatorPhase {
        self.phase
    }

    pub fn selections(&self) -> &QuizSelection {
        &self.selections
    }
}
