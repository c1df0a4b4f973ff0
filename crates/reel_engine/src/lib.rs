//! Reel engine: remote stage I/O, polling loops and cancellation.
mod client;
mod config;
mod engine;
mod probe;
mod resolve;
mod scheduler;
mod types;
mod wire;

pub use client::{build_http_client, ReqwestStageClient, StageClient, StageError};
pub use config::{ConfigError, EngineConfig, MediaLocation};
pub use engine::{EngineCommand, EngineHandle};
pub use probe::{ArtifactProber, ProbeOutcome, Prober, StatusKind, StatusProber};
pub use resolve::resolve_storage_url;
pub use scheduler::{run_poll_loop, AttemptSink, NullAttemptSink, PollConfig};
pub use types::{
    EngineEvent, ImageAsset, PollResult, RenderSettings, ScriptLine, StageKind, StageOutput,
    SubmitReply, SummaryBulletOutput, SummaryOutput,
};
pub use wire::{
    AsyncAccepted, BulletReply, ImageReply, RenderHighlight, RenderSubmitRequest, StatusReply,
    SummaryReply, SummarySubmitRequest,
};
