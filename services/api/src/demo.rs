use crate::infra::{demo_catalog, InMemoryAssessmentStore, ProgressFlag, SessionIdentity};
use clap::Args;
use somnia::assessment::{
    AdvanceOutcome, CompletionRoute, DeferredSaver, ProgressMarker, Question, ResolvedResults,
    ResultsKey, ResultsResolver, ResultsView, StepNavigator, SubmissionConfig,
    SubmissionCoordinator, SubmissionInput, UserId,
};
use somnia::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Run the authenticated immediate-save branch instead of the guest
    /// login detour
    #[arg(long)]
    pub(crate) authenticated: bool,
    /// Redundant re-renders fired at the deferred save in the guest flow
    #[arg(long, default_value_t = 3)]
    pub(crate) replays: usize,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        authenticated,
        replays,
    } = args;

    let catalog = demo_catalog();
    let store = Arc::new(InMemoryAssessmentStore::default());
    let session = Arc::new(SessionIdentity::default());
    let marker = Arc::new(ProgressFlag::default());

    println!("Somnia assessment demo");
    println!("Loaded {} questions from the catalog\n", catalog.len());

    if authenticated {
        session.sign_in(UserId("demo-user".to_string()));
        println!("Session: demo-user (authenticated flow)\n");
    } else {
        println!("Session: none (guest flow)\n");
    }

    let input = walk_quiz(&catalog, marker.as_ref());

    let mut coordinator = SubmissionCoordinator::new(
        store.clone(),
        session.clone(),
        marker.clone(),
        SubmissionConfig::immediate(),
    );

    let route = coordinator.complete(input, &catalog).await;

    let (key, handoff) = match route {
        CompletionRoute::Results { key, handoff } => {
            println!("Submission persisted, results addressed by '{key}'");
            (key, handoff)
        }
        CompletionRoute::Login { handoff } => {
            println!("No session: redirecting to login with the answers attached");

            // The login window comes back without a user first; the result
            // is still shown behind the guest sentinel.
            let route = coordinator
                .resume(&handoff, &catalog)
                .await
                .ok_or_else(|| {
                    AppError::Io(std::io::Error::other("resume payload was rejected"))
                })?;
            match route {
                CompletionRoute::Results { key, handoff } => {
                    println!("Login skipped: showing the guest result from the hand-off payload");
                    (key, handoff)
                }
                CompletionRoute::Login { .. } => {
                    return Err(AppError::Io(std::io::Error::other(
                        "resume unexpectedly routed back to login",
                    )))
                }
            }
        }
    };

    println!(
        "Assessment-in-progress marker is {}\n",
        if marker.is_set() { "set" } else { "clear" }
    );

    let resolver = ResultsResolver::new(
        Arc::new(crate::infra::StaticQuestionSource::new(catalog.clone())),
        store.clone(),
    );

    let resolved = resolver.resolve(&key, Some(&handoff)).await;
    if let ResolvedResults::Ready(view) = &resolved {
        render_results(view);
    }

    let final_key = if key.is_guest() {
        println!("\nUser signs in as demo-user from the results view");
        session.sign_in(UserId("demo-user".to_string()));

        let user = UserId("demo-user".to_string());
        let mut saver = DeferredSaver::new(store.clone());
        let outcome = saver.auto_save(&user, &handoff).await.ok_or_else(|| {
            AppError::Io(std::io::Error::other("deferred save did not run"))
        })?;
        println!("{}", outcome.notice);

        for _ in 0..replays {
            // Redundant reactive recomputations for the same login event.
            let repeat = saver.auto_save(&user, &handoff).await;
            debug_assert!(repeat.is_none());
        }
        println!(
            "{} redundant re-renders later the store saw {} create call(s)",
            replays,
            store.create_calls()
        );

        let saved = ResultsKey::Assessment(outcome.id);
        println!("Results address silently replaced: 'guest' -> '{saved}'");
        saved
    } else {
        key
    };

    // Fresh navigation to the saved record: no hand-off, fetched and
    // classified from the persisted state.
    let resolved = resolver.resolve(&final_key, None).await;
    match resolved {
        ResolvedResults::Ready(view) => {
            println!("\nReloaded '{final_key}' from the assessment service");
            render_results(&view);
        }
        ResolvedResults::NothingToShow => {
            println!("\nNothing to show for '{final_key}'");
        }
        ResolvedResults::Unavailable { message } => {
            println!("\n{message}");
        }
    }

    Ok(())
}

fn walk_quiz(catalog: &[Question], marker: &dyn ProgressMarker) -> SubmissionInput {
    let mut navigator = StepNavigator::new(catalog.len());

    loop {
        let step = navigator.current_step();
        let question = &catalog[step];
        // The scripted persona always reports the most severe option.
        if let Some(pick) = question.answers.last() {
            if navigator.select_answer(step, pick.id.clone())
                && navigator.progress().answered == 1
            {
                marker.set();
            }
            println!("  {} -> {}", question.prompt, pick.label);
        }

        match navigator.advance() {
            AdvanceOutcome::Moved(_) => continue,
            AdvanceOutcome::Completed(input) => {
                let progress = navigator.progress();
                println!(
                    "Quiz complete: {}/{} answered\n",
                    progress.answered, progress.total
                );
                return input;
            }
        }
    }
}

fn render_results(view: &ResultsView) {
    println!("Score: {}", view.score);
    println!("Status: {}", view.risk.status);
    println!("  Should: {}", view.risk.plan.should);
    println!("  Recommended: {}", view.risk.plan.recommended);
    for optional in view.risk.plan.optional {
        println!("  Optional: {optional}");
    }
}
