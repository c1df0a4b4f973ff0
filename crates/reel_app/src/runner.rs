//! Blocking pipeline driver: one run from source URL to rendered artifact.

use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use reel_core::{
    update, JobStatus, Msg, PipelineState, RenderOptions, Stage, StageFault,
};
use reel_engine::EngineHandle;

use crate::bridge::{dispatch_effects, msg_from_event, now_ms};

const PUMP_IDLE: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Preview pass finished; no rendering was requested.
    Preview { title: String, highlights: usize },
    /// The artifact-existence probe confirmed the rendered output.
    Rendered { media_id: String },
    /// A stage ended in a terminal fault.
    Faulted { stage: Stage, fault: StageFault },
}

/// Drives one pipeline run to a terminal outcome.
///
/// All engine events funnel through [`update`]; this loop owns the only
/// mutable reference to the state, so stage results always apply in the
/// order their loops produced them.
pub fn run_pipeline(engine: &EngineHandle, source_url: String, preview_only: bool) -> RunOutcome {
    let mut state = PipelineState::new();
    state = apply(
        engine,
        state,
        Msg::RunStarted {
            source_url,
            at: now_ms(),
        },
    );
    let first_request = if preview_only {
        Msg::ExtractRequested { at: now_ms() }
    } else {
        Msg::SummarizeRequested { at: now_ms() }
    };
    state = apply(engine, state, first_request);

    let mut render_requested = false;
    loop {
        while let Some(event) = engine.try_recv() {
            state = apply(engine, state, msg_from_event(event));
        }

        if let Some((stage, fault)) = first_fault(&state) {
            engine_warn!("stage {stage} ended in fault: {fault}");
            return RunOutcome::Faulted { stage, fault };
        }

        if preview_only {
            if stage_completed(&state, Stage::Extract) {
                let view = state.view();
                return RunOutcome::Preview {
                    title: view.title,
                    highlights: view.editable_highlights.len(),
                };
            }
        } else {
            if !render_requested && stage_completed(&state, Stage::Summarize) {
                render_requested = true;
                engine_info!("summary ready; submitting render");
                state = apply(
                    engine,
                    state,
                    Msg::RenderRequested {
                        options: RenderOptions::default(),
                        at: now_ms(),
                    },
                );
            }
            if let Some(media_id) = state.artifact().rendered_media_id.clone() {
                return RunOutcome::Rendered { media_id };
            }
        }

        thread::sleep(PUMP_IDLE);
    }
}

fn apply(engine: &EngineHandle, state: PipelineState, msg: Msg) -> PipelineState {
    let (state, effects) = update(state, msg);
    dispatch_effects(engine, effects);
    state
}

fn stage_completed(state: &PipelineState, stage: Stage) -> bool {
    state
        .job(stage)
        .is_some_and(|job| job.status == JobStatus::Completed)
}

fn first_fault(state: &PipelineState) -> Option<(Stage, StageFault)> {
    Stage::ALL
        .iter()
        .find_map(|stage| state.fault(*stage).map(|fault| (*stage, fault.clone())))
}
