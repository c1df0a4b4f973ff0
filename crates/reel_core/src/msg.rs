use crate::{EpochMs, RenderOptions, Stage, StageResult};

/// Classification of a submit reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The stage completed synchronously inside the submit call.
    Immediate(StageResult),
    /// The stage accepted the work and returned an async job handle.
    Accepted { job_id: String },
}

/// Terminal result of one polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(StageResult),
    Failed(String),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A new pipeline run begins; discards any previous run wholesale.
    RunStarted { source_url: String, at: EpochMs },
    /// The user walked away from the current run.
    RunAbandoned,
    /// Fast title/preview pass (`full: false`) against the summary endpoint.
    ExtractRequested { at: EpochMs },
    /// Full highlight generation (`full: true`).
    SummarizeRequested { at: EpochMs },
    /// Submit the current highlight script for rendering.
    RenderRequested { options: RenderOptions, at: EpochMs },
    /// Engine resolved a submit call, successfully or not.
    SubmitResolved {
        stage: Stage,
        generation: u64,
        outcome: Result<SubmitOutcome, String>,
        at: EpochMs,
    },
    /// Engine issued one probe for a live polling loop.
    ProbeAttempted {
        stage: Stage,
        generation: u64,
        at: EpochMs,
    },
    /// A polling loop reached a terminal state.
    PollFinished {
        stage: Stage,
        generation: u64,
        outcome: PollOutcome,
        at: EpochMs,
    },
    /// User edited the text of one highlight.
    HighlightTextEdited { order: u32, text: String },
    /// User picked an image (by resolved URL, from the known pool) or cleared it.
    HighlightImageSelected { order: u32, image_url: Option<String> },
    /// User removed one highlight; remaining orders stay stable.
    HighlightRemoved { order: u32 },
    /// Fallback for placeholder wiring.
    NoOp,
}
