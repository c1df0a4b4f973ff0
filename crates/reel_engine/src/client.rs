use async_trait::async_trait;
use engine_logging::engine_debug;
use serde::Serialize;
use thiserror::Error;

use crate::config::EngineConfig;
use crate::types::{StageKind, StageOutput, SubmitReply};
use crate::wire::{AsyncAccepted, RenderSubmitRequest, SummaryReply, SummarySubmitRequest};

/// Failure of a single submit call. Submits are never retried; the error is
/// reported to the coordinator as-is so duplicate side-effecting work is
/// never triggered on the remote stage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("stage returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed stage reply: {0}")]
    Malformed(String),
}

/// Submits one unit of work to a stage endpoint and classifies the reply.
#[async_trait]
pub trait StageClient: Send + Sync {
    async fn submit_summary(
        &self,
        request: SummarySubmitRequest,
    ) -> Result<SubmitReply, StageError>;

    async fn submit_render(&self, request: RenderSubmitRequest)
        -> Result<SubmitReply, StageError>;
}

/// Builds the shared HTTP client with the configured timeouts.
pub fn build_http_client(config: &EngineConfig) -> Result<reqwest::Client, StageError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()
        .map_err(|err| StageError::Network(err.to_string()))
}

#[derive(Debug, Clone)]
pub struct ReqwestStageClient {
    http: reqwest::Client,
    config: EngineConfig,
}

impl ReqwestStageClient {
    pub fn new(http: reqwest::Client, config: EngineConfig) -> Self {
        Self { http, config }
    }

    async fn post(
        &self,
        url: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<String, StageError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| StageError::Network(err.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| StageError::Network(err.to_string()))?;

        if !status.is_success() {
            return Err(StageError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl StageClient for ReqwestStageClient {
    async fn submit_summary(
        &self,
        request: SummarySubmitRequest,
    ) -> Result<SubmitReply, StageError> {
        let url = self.config.submit_url(StageKind::Summarize);
        let body = self.post(&url, &request).await?;

        // A job identifier in the reply selects the async path.
        if let Some(accepted) = decode_job_handle(&body) {
            engine_debug!("summary submit accepted async job {}", accepted.job_id);
            return Ok(SubmitReply::Accepted {
                job_id: accepted.job_id,
            });
        }

        let reply: SummaryReply =
            serde_json::from_str(&body).map_err(|err| StageError::Malformed(err.to_string()))?;
        Ok(SubmitReply::Immediate(StageOutput::Summary(
            reply.into_output(&self.config.media),
        )))
    }

    async fn submit_render(
        &self,
        request: RenderSubmitRequest,
    ) -> Result<SubmitReply, StageError> {
        let url = self.config.submit_url(StageKind::Render);
        let body = self.post(&url, &request).await?;

        // Rendering is always asynchronous; a reply without a handle is broken.
        match decode_job_handle(&body) {
            Some(accepted) => Ok(SubmitReply::Accepted {
                job_id: accepted.job_id,
            }),
            None => Err(StageError::Malformed(
                "render reply carried no job_id".to_string(),
            )),
        }
    }
}

fn decode_job_handle(body: &str) -> Option<AsyncAccepted> {
    serde_json::from_str::<AsyncAccepted>(body).ok()
}
