use super::common::ids;
use crate::assessment::domain::AnswerId;
use crate::assessment::navigator::{AdvanceOutcome, NavigatorPhase, StepNavigator};

fn pick(id: &str) -> AnswerId {
    AnswerId(id.to_string())
}

#[test]
fn walks_forward_and_back_through_the_steps() {
    let mut navigator = StepNavigator::new(3);
    assert_eq!(navigator.current_step(), 0);

    assert_eq!(navigator.advance(), AdvanceOutcome::Moved(1));
    assert_eq!(navigator.advance(), AdvanceOutcome::Moved(2));
    assert_eq!(navigator.retreat(), 1);
    assert_eq!(navigator.retreat(), 0);
    assert_eq!(navigator.retreat(), 0, "retreat is a no-op at the first step");
}

#[test]
fn final_advance_projects_selections_in_step_order() {
    let mut navigator = StepNavigator::new(2);
    assert!(navigator.select_answer(1, pick("q2-a")));
    assert!(navigator.select_answer(0, pick("q1-b")));
    navigator.advance();

    match navigator.advance() {
        AdvanceOutcome::Completed(input) => {
            assert_eq!(input.answers, ids(&["q1-b", "q2-a"]));
        }
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(navigator.phase(), NavigatorPhase::Submitting);
}

#[test]
fn reselection_overwrites_instead_of_appending() {
    let mut navigator = StepNavigator::new(2);
    assert!(navigator.select_answer(0, pick("q1-a")));
    assert!(navigator.select_answer(0, pick("q1-b")));

    assert_eq!(navigator.progress().answered, 1);
    assert_eq!(
        navigator.selections().answer_for(0),
        Some(&pick("q1-b"))
    );
}

#[test]
fn picks_are_rejected_once_submission_starts() {
    let mut navigator = StepNavigator::new(1);
    assert!(navigator.select_answer(0, pick("q1-a")));
    navigator.advance();

    assert!(!navigator.select_answer(0, pick("q1-b")));
    navigator.begin_celebration();
    assert!(!navigator.select_answer(0, pick("q1-b")));
    assert_eq!(
        navigator.selections().answer_for(0),
        Some(&pick("q1-a"))
    );
}

#[test]
fn picks_beyond_the_catalog_are_rejected() {
    let mut navigator = StepNavigator::new(2);
    assert!(!navigator.select_answer(2, pick("q3-a")));
    assert_eq!(navigator.progress().answered, 0);
}

#[test]
fn progress_reflects_completion_not_position() {
    let mut navigator = StepNavigator::new(4);
    navigator.select_answer(0, pick("a"));
    navigator.advance();
    navigator.select_answer(1, pick("b"));
    navigator.advance();
    navigator.select_answer(2, pick("c"));

    // Revisit the first step: position drops, progress does not.
    navigator.retreat();
    navigator.retreat();
    assert_eq!(navigator.current_step(), 0);

    let progress = navigator.progress();
    assert_eq!(progress.answered, 3);
    assert_eq!(progress.total, 4);
}

#[test]
fn single_step_quiz_completes_on_first_advance() {
    let mut navigator = StepNavigator::new(1);
    navigator.select_answer(0, pick("only"));
    match navigator.advance() {
        AdvanceOutcome::Completed(input) => assert_eq!(input.answers, ids(&["only"])),
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn an_empty_catalog_completes_with_no_answers() {
    // "No assessment available" is a valid terminal state; the navigator
    // must not get stuck on it.
    let mut navigator = StepNavigator::new(0);
    assert!(!navigator.select_answer(0, pick("anything")));
    match navigator.advance() {
        AdvanceOutcome::Completed(input) => assert!(input.answers.is_empty()),
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn unanswered_steps_are_simply_absent_from_the_projection() {
    let mut navigator = StepNavigator::new(3);
    navigator.select_answer(1, pick("middle"));
    navigator.advance();
    navigator.advance();
    match navigator.advance() {
        AdvanceOutcome::Completed(input) => assert_eq!(input.answers, ids(&["middle"])),
        other => panic!("expected completion, got {other:?}"),
    }
}
