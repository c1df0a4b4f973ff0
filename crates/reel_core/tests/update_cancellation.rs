use pretty_assertions::assert_eq;
use reel_core::{
    update, Effect, Msg, PipelineState, PollOutcome, RenderOptions, Stage, StageResult,
    SubmitOutcome, SummaryBullet, SummaryOutcome,
};

fn start_run(url: &str) -> PipelineState {
    let state = PipelineState::new();
    let (state, _effects) = update(
        state,
        Msg::RunStarted {
            source_url: url.to_string(),
            at: 1_000,
        },
    );
    state
}

fn seeded_state() -> PipelineState {
    let state = start_run("https://x.test/a");
    let (state, _effects) = update(state, Msg::SummarizeRequested { at: 1_100 });
    let generation = state.current_generation(Stage::Summarize);
    let outcome = SummaryOutcome {
        title: "T".to_string(),
        bullets: vec![SummaryBullet {
            text: "h1".to_string(),
            images: Vec::new(),
        }],
    };
    let (state, _effects) = update(
        state,
        Msg::SubmitResolved {
            stage: Stage::Summarize,
            generation,
            outcome: Ok(SubmitOutcome::Immediate(StageResult::Summary(outcome))),
            at: 1_200,
        },
    );
    state
}

#[test]
fn resubmission_cancels_before_submitting_and_bumps_generation() {
    let state = start_run("https://x.test/a");
    let (state, _effects) = update(state, Msg::SummarizeRequested { at: 1_100 });
    let first_gen = state.current_generation(Stage::Summarize);

    let (state, effects) = update(state, Msg::SummarizeRequested { at: 1_500 });
    let second_gen = state.current_generation(Stage::Summarize);

    assert_eq!(second_gen, first_gen + 1);
    assert_eq!(
        effects,
        vec![
            Effect::CancelStage {
                stage: Stage::Summarize
            },
            Effect::SubmitSummary {
                stage: Stage::Summarize,
                generation: second_gen,
                source_url: "https://x.test/a".to_string(),
                full: true,
            },
        ]
    );
}

#[test]
fn stale_submit_result_is_discarded() {
    let state = start_run("https://x.test/a");
    let (state, _effects) = update(state, Msg::SummarizeRequested { at: 1_100 });
    let stale_gen = state.current_generation(Stage::Summarize);
    let (state, _effects) = update(state, Msg::SummarizeRequested { at: 1_500 });

    let outcome = SummaryOutcome {
        title: "stale".to_string(),
        bullets: Vec::new(),
    };
    let (state, effects) = update(
        state,
        Msg::SubmitResolved {
            stage: Stage::Summarize,
            generation: stale_gen,
            outcome: Ok(SubmitOutcome::Immediate(StageResult::Summary(outcome))),
            at: 1_600,
        },
    );

    assert_eq!(effects, Vec::new());
    // The stale loop's result never reaches the artifact.
    assert_eq!(state.artifact().title, "");
    assert!(state.artifact().highlights.is_empty());
}

#[test]
fn stale_poll_result_after_new_render_is_discarded() {
    let state = seeded_state();
    let (state, _effects) = update(
        state,
        Msg::RenderRequested {
            options: RenderOptions::default(),
            at: 2_000,
        },
    );
    let stale_gen = state.current_generation(Stage::Render);

    // A second render supersedes the first before its loop finishes.
    let (state, _effects) = update(
        state,
        Msg::RenderRequested {
            options: RenderOptions::default(),
            at: 2_500,
        },
    );

    let (state, effects) = update(
        state,
        Msg::PollFinished {
            stage: Stage::Render,
            generation: stale_gen,
            outcome: PollOutcome::Completed(StageResult::RenderFinished {
                job_id: "OLD".to_string(),
            }),
            at: 3_000,
        },
    );

    // No artifact probe may start for the superseded render.
    assert_eq!(effects, Vec::new());
    assert!(state.job(Stage::Probe).is_none());
}

#[test]
fn abandoning_a_run_cancels_everything_and_invalidates_old_events() {
    let state = seeded_state();
    let (state, _effects) = update(
        state,
        Msg::RenderRequested {
            options: RenderOptions::default(),
            at: 2_000,
        },
    );
    let old_gen = state.current_generation(Stage::Render);

    let (state, effects) = update(state, Msg::RunAbandoned);
    assert_eq!(effects, vec![Effect::CancelAll]);
    assert!(!state.has_run());
    assert!(state.artifact().highlights.is_empty());

    // A straggler event from the abandoned run cannot match any generation.
    let (state, effects) = update(
        state,
        Msg::PollFinished {
            stage: Stage::Render,
            generation: old_gen,
            outcome: PollOutcome::Completed(StageResult::RenderFinished {
                job_id: "J1".to_string(),
            }),
            at: 9_000,
        },
    );
    assert_eq!(effects, Vec::new());
    assert!(state.job(Stage::Render).is_none());
}

#[test]
fn starting_a_new_run_discards_the_previous_artifact() {
    let state = seeded_state();
    assert_eq!(state.artifact().title, "T");

    let (state, effects) = update(
        state,
        Msg::RunStarted {
            source_url: "https://y.test/b".to_string(),
            at: 5_000,
        },
    );
    assert_eq!(effects, vec![Effect::CancelAll]);
    assert_eq!(state.artifact().source_url, "https://y.test/b");
    assert_eq!(state.artifact().title, "");
    assert!(state.artifact().highlights.is_empty());
}

#[test]
fn requests_without_a_run_are_ignored() {
    let state = PipelineState::new();
    let (state, effects) = update(state, Msg::SummarizeRequested { at: 100 });
    assert_eq!(effects, Vec::new());
    assert!(state.job(Stage::Summarize).is_none());
}
