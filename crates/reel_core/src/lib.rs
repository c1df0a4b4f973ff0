//! Reel core: pure pipeline state machine, no I/O.
mod artifact;
mod effect;
mod job;
mod msg;
mod state;
mod update;
mod view_model;

pub use artifact::{
    EpochMs, Highlight, ImageRef, PipelineArtifact, RenderOptions, StageResult, SummaryBullet,
    SummaryOutcome, TITLE_ORDER,
};
pub use effect::Effect;
pub use job::{Job, JobStatus, Stage, StageFault};
pub use msg::{Msg, PollOutcome, SubmitOutcome};
pub use state::PipelineState;
pub use update::update;
pub use view_model::{JobRowView, PipelineView};
