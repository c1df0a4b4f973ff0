//! Mapping between the core and engine type vocabularies. The two crates do
//! not depend on each other; this is the only place that knows both.

use chrono::Utc;
use reel_core::{
    Effect, EpochMs, ImageRef, Msg, PollOutcome, Stage, StageResult, SubmitOutcome,
    SummaryBullet, SummaryOutcome,
};
use reel_engine::{
    EngineCommand, EngineEvent, EngineHandle, ImageAsset, PollResult, RenderSettings, ScriptLine,
    StageKind, StageOutput, SubmitReply, SummaryOutput,
};

pub fn now_ms() -> EpochMs {
    Utc::now().timestamp_millis()
}

/// Sends each effect the update function produced to the engine, in order.
/// Cancellations precede the submissions that replace them.
pub fn dispatch_effects(engine: &EngineHandle, effects: Vec<Effect>) {
    for effect in effects {
        engine.dispatch(command_for(effect));
    }
}

fn command_for(effect: Effect) -> EngineCommand {
    match effect {
        Effect::CancelStage { stage } => EngineCommand::CancelStage {
            stage: stage_kind(stage),
        },
        Effect::CancelAll => EngineCommand::CancelAll,
        Effect::SubmitSummary {
            stage,
            generation,
            source_url,
            full,
        } => EngineCommand::SubmitSummary {
            stage: stage_kind(stage),
            generation,
            source_url,
            full,
        },
        Effect::SubmitRender {
            generation,
            script,
            options,
        } => EngineCommand::SubmitRender {
            generation,
            script: script
                .into_iter()
                .map(|highlight| ScriptLine {
                    order: highlight.order,
                    text: highlight.text,
                    image: highlight.image.map(|image| image.url),
                })
                .collect(),
            settings: RenderSettings {
                voice: options.voice,
                aspect_ratio: options.aspect_ratio,
                transition_style: options.transition_style,
                subtitle_chunk_size: options.subtitle_chunk_size,
            },
        },
        Effect::StartStatusPolling {
            stage,
            generation,
            job_id,
        } => EngineCommand::StartStatusPoll {
            stage: stage_kind(stage),
            generation,
            job_id,
        },
        Effect::StartArtifactProbe {
            generation,
            media_id,
        } => EngineCommand::StartArtifactProbe {
            generation,
            media_id,
        },
    }
}

/// Translates an engine event into a core message, stamping the current time.
pub fn msg_from_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SubmitResolved {
            stage,
            generation,
            outcome,
        } => Msg::SubmitResolved {
            stage: core_stage(stage),
            generation,
            outcome: outcome
                .map(submit_outcome)
                .map_err(|err| err.to_string()),
            at: now_ms(),
        },
        EngineEvent::ProbeAttempted {
            stage, generation, ..
        } => Msg::ProbeAttempted {
            stage: core_stage(stage),
            generation,
            at: now_ms(),
        },
        EngineEvent::PollFinished {
            stage,
            generation,
            outcome,
        } => Msg::PollFinished {
            stage: core_stage(stage),
            generation,
            outcome: poll_outcome(outcome),
            at: now_ms(),
        },
    }
}

fn stage_kind(stage: Stage) -> StageKind {
    match stage {
        Stage::Extract => StageKind::Extract,
        Stage::Summarize => StageKind::Summarize,
        Stage::Render => StageKind::Render,
        Stage::Probe => StageKind::Probe,
    }
}

fn core_stage(stage: StageKind) -> Stage {
    match stage {
        StageKind::Extract => Stage::Extract,
        StageKind::Summarize => Stage::Summarize,
        StageKind::Render => Stage::Render,
        StageKind::Probe => Stage::Probe,
    }
}

fn submit_outcome(reply: SubmitReply) -> SubmitOutcome {
    match reply {
        SubmitReply::Immediate(output) => SubmitOutcome::Immediate(stage_result(output)),
        SubmitReply::Accepted { job_id } => SubmitOutcome::Accepted { job_id },
    }
}

fn poll_outcome(result: PollResult) -> PollOutcome {
    match result {
        PollResult::Completed(output) => PollOutcome::Completed(stage_result(output)),
        PollResult::Failed(reason) => PollOutcome::Failed(reason),
        PollResult::TimedOut => PollOutcome::TimedOut,
    }
}

fn stage_result(output: StageOutput) -> StageResult {
    match output {
        StageOutput::Summary(summary) => StageResult::Summary(summary_outcome(summary)),
        StageOutput::RenderFinished { job_id } => StageResult::RenderFinished { job_id },
        StageOutput::ArtifactReady { media_id } => StageResult::ArtifactReady { media_id },
    }
}

fn summary_outcome(summary: SummaryOutput) -> SummaryOutcome {
    SummaryOutcome {
        title: summary.title,
        bullets: summary
            .bullets
            .into_iter()
            .map(|bullet| SummaryBullet {
                text: bullet.text,
                images: bullet.images.into_iter().map(image_ref).collect(),
            })
            .collect(),
    }
}

fn image_ref(asset: ImageAsset) -> ImageRef {
    ImageRef {
        url: asset.url,
        storage_key: asset.storage_key,
        title: asset.title,
        caption: asset.caption,
    }
}
