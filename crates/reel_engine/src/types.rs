use std::fmt;

use crate::client::StageError;

/// Engine-side stage identity. The app maps this onto its own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Extract,
    Summarize,
    Render,
    Probe,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Extract => write!(f, "extract"),
            StageKind::Summarize => write!(f, "summarize"),
            StageKind::Render => write!(f, "render"),
            StageKind::Probe => write!(f, "probe"),
        }
    }
}

/// An image offered by a stage, with its `url` already resolved to HTTP(S).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub url: String,
    pub storage_key: String,
    pub title: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBulletOutput {
    pub text: String,
    pub images: Vec<ImageAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutput {
    pub title: String,
    pub bullets: Vec<SummaryBulletOutput>,
}

/// Typed terminal payload of a stage, decoded eagerly at the wire boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    Summary(SummaryOutput),
    RenderFinished { job_id: String },
    ArtifactReady { media_id: String },
}

/// Classified reply to a submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    Immediate(StageOutput),
    Accepted { job_id: String },
}

/// Terminal result of one polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Completed(StageOutput),
    Failed(String),
    TimedOut,
}

/// One line of the render script, image given as a resolved URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub order: u32,
    pub text: String,
    pub image: Option<String>,
}

/// Rendering parameters forwarded to the render stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub voice: String,
    pub aspect_ratio: String,
    pub transition_style: String,
    pub subtitle_chunk_size: u32,
}

/// Event surfaced to the consumer of the engine. Every event echoes the
/// generation of the command that caused it so stale ones can be dropped.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    SubmitResolved {
        stage: StageKind,
        generation: u64,
        outcome: Result<SubmitReply, StageError>,
    },
    ProbeAttempted {
        stage: StageKind,
        generation: u64,
        attempts: u32,
    },
    PollFinished {
        stage: StageKind,
        generation: u64,
        outcome: PollResult,
    },
}
