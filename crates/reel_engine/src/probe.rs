use async_trait::async_trait;
use engine_logging::engine_debug;

use crate::config::MediaLocation;
use crate::types::StageOutput;
use crate::wire::{StatusReply, SummaryReply};

/// Result of a single probe. Transport problems are transient by definition
/// and come back as `Pending`; only the remote saying "failed" is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Pending,
    Done(StageOutput),
    Failed(String),
}

/// One "is this done yet" check against a live job.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

/// How a `"completed"` status payload maps into stage output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    /// Decode `result` as a summary reply; image references are resolved
    /// against `media`.
    Summary { media: MediaLocation },
    /// The render status carries no payload worth decoding; completion just
    /// hands the job id on to the artifact phase.
    Render { job_id: String },
}

/// Polls the job-status endpoint of a stage.
pub struct StatusProber {
    http: reqwest::Client,
    status_url: String,
    kind: StatusKind,
}

impl StatusProber {
    pub fn new(http: reqwest::Client, status_url: String, kind: StatusKind) -> Self {
        Self {
            http,
            status_url,
            kind,
        }
    }

    fn map_completed(&self, reply: StatusReply) -> ProbeOutcome {
        match &self.kind {
            StatusKind::Summary { media } => {
                let Some(result) = reply.result else {
                    return ProbeOutcome::Failed("completed status carried no result".to_string());
                };
                match serde_json::from_value::<SummaryReply>(result) {
                    Ok(summary) => {
                        ProbeOutcome::Done(StageOutput::Summary(summary.into_output(media)))
                    }
                    Err(err) => ProbeOutcome::Failed(format!("malformed summary result: {err}")),
                }
            }
            StatusKind::Render { job_id } => ProbeOutcome::Done(StageOutput::RenderFinished {
                job_id: job_id.clone(),
            }),
        }
    }
}

#[async_trait]
impl Prober for StatusProber {
    async fn probe(&self) -> ProbeOutcome {
        let response = match self.http.get(&self.status_url).send().await {
            Ok(response) => response,
            Err(err) => {
                engine_debug!("status probe transport error, treating as pending: {err}");
                return ProbeOutcome::Pending;
            }
        };
        if !response.status().is_success() {
            return ProbeOutcome::Pending;
        }
        let reply: StatusReply = match response.json().await {
            Ok(reply) => reply,
            Err(_) => return ProbeOutcome::Pending,
        };

        match reply.status.as_str() {
            "completed" => self.map_completed(reply),
            "failed" => ProbeOutcome::Failed(
                reply
                    .error
                    .unwrap_or_else(|| "stage reported failure".to_string()),
            ),
            _ => ProbeOutcome::Pending,
        }
    }
}

/// Existence check against the rendered artifact's address. There is no job
/// API behind it, so absence is always `Pending`; only the scheduler's
/// timeout makes persistent absence terminal.
pub struct ArtifactProber {
    http: reqwest::Client,
    artifact_url: String,
    media_id: String,
}

impl ArtifactProber {
    pub fn new(http: reqwest::Client, artifact_url: String, media_id: String) -> Self {
        Self {
            http,
            artifact_url,
            media_id,
        }
    }
}

#[async_trait]
impl Prober for ArtifactProber {
    async fn probe(&self) -> ProbeOutcome {
        match self.http.head(&self.artifact_url).send().await {
            Ok(response) if response.status().is_success() => {
                ProbeOutcome::Done(StageOutput::ArtifactReady {
                    media_id: self.media_id.clone(),
                })
            }
            _ => ProbeOutcome::Pending,
        }
    }
}
