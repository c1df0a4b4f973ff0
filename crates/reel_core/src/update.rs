use crate::{
    Effect, Msg, PipelineState, PollOutcome, Stage, StageResult, SubmitOutcome,
};

/// Pure coordinator step: applies a message to state and returns the I/O
/// effects the engine should perform next.
pub fn update(mut state: PipelineState, msg: Msg) -> (PipelineState, Vec<Effect>) {
    let effects = match msg {
        Msg::RunStarted { source_url, at: _ } => {
            state.begin_run(source_url);
            vec![Effect::CancelAll]
        }
        Msg::RunAbandoned => {
            state.abandon_run();
            vec![Effect::CancelAll]
        }
        Msg::ExtractRequested { at } => submit_summary(&mut state, Stage::Extract, false, at),
        Msg::SummarizeRequested { at } => submit_summary(&mut state, Stage::Summarize, true, at),
        Msg::RenderRequested { options, at } => {
            if state.artifact().highlights.is_empty() {
                return (state, Vec::new());
            }
            // Starting a render invalidates both the render loop and any
            // artifact probe left over from an earlier attempt.
            let generation = state.bump_generation(Stage::Render);
            state.bump_generation(Stage::Probe);
            state.start_job(Stage::Render, at);
            vec![
                Effect::CancelStage {
                    stage: Stage::Render,
                },
                Effect::CancelStage { stage: Stage::Probe },
                Effect::SubmitRender {
                    generation,
                    script: state.artifact().highlights.clone(),
                    options,
                },
            ]
        }
        Msg::SubmitResolved {
            stage,
            generation,
            outcome,
            at,
        } => {
            if !state.is_current(stage, generation) {
                return (state, Vec::new());
            }
            match outcome {
                Ok(SubmitOutcome::Immediate(result)) => complete_stage(&mut state, stage, result, at),
                Ok(SubmitOutcome::Accepted { job_id }) => {
                    state.assign_job_handle(stage, job_id.clone());
                    vec![Effect::StartStatusPolling {
                        stage,
                        generation,
                        job_id,
                    }]
                }
                Err(reason) => {
                    state.fail_job(stage, reason);
                    Vec::new()
                }
            }
        }
        Msg::ProbeAttempted {
            stage,
            generation,
            at,
        } => {
            if state.is_current(stage, generation) {
                state.record_probe(stage, at);
            }
            Vec::new()
        }
        Msg::PollFinished {
            stage,
            generation,
            outcome,
            at,
        } => {
            if !state.is_current(stage, generation) {
                return (state, Vec::new());
            }
            match outcome {
                PollOutcome::Completed(result) => complete_stage(&mut state, stage, result, at),
                PollOutcome::Failed(reason) => {
                    state.fail_job(stage, reason);
                    Vec::new()
                }
                PollOutcome::TimedOut => {
                    state.time_out_job(stage);
                    Vec::new()
                }
            }
        }
        Msg::HighlightTextEdited { order, text } => {
            state.set_highlight_text(order, text);
            Vec::new()
        }
        Msg::HighlightImageSelected { order, image_url } => {
            state.select_highlight_image(order, image_url);
            Vec::new()
        }
        Msg::HighlightRemoved { order } => {
            state.remove_highlight(order);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_summary(
    state: &mut PipelineState,
    stage: Stage,
    full: bool,
    at: crate::EpochMs,
) -> Vec<Effect> {
    if !state.has_run() {
        return Vec::new();
    }
    let generation = state.bump_generation(stage);
    state.start_job(stage, at);
    vec![
        Effect::CancelStage { stage },
        Effect::SubmitSummary {
            stage,
            generation,
            source_url: state.artifact().source_url.clone(),
            full,
        },
    ]
}

/// Merge a terminal stage result into the artifact and decide what runs next.
fn complete_stage(
    state: &mut PipelineState,
    stage: Stage,
    result: StageResult,
    at: crate::EpochMs,
) -> Vec<Effect> {
    state.complete_job(stage, result.clone());
    match result {
        StageResult::Summary(outcome) => {
            state.apply_summary(outcome);
            Vec::new()
        }
        StageResult::RenderFinished { job_id } => {
            // "Render finished" only means the job was processed; readiness
            // of the artifact is established by the existence probe.
            let generation = state.bump_generation(Stage::Probe);
            state.start_job(Stage::Probe, at);
            state.assign_job_handle(Stage::Probe, job_id.clone());
            vec![
                Effect::CancelStage { stage: Stage::Probe },
                Effect::StartArtifactProbe {
                    generation,
                    media_id: job_id,
                },
            ]
        }
        StageResult::ArtifactReady { media_id } => {
            state.set_rendered_media(media_id);
            Vec::new()
        }
    }
}
