use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_info, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{build_http_client, ReqwestStageClient, StageClient, StageError};
use crate::config::EngineConfig;
use crate::probe::{ArtifactProber, StatusKind, StatusProber};
use crate::scheduler::{run_poll_loop, AttemptSink};
use crate::types::{EngineEvent, RenderSettings, ScriptLine, StageKind};
use crate::wire::{RenderHighlight, RenderSubmitRequest, SummarySubmitRequest};

/// Commands accepted by the engine thread. Commands that start work carry
/// the generation they belong to; the engine echoes it back on every event.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    SubmitSummary {
        stage: StageKind,
        generation: u64,
        source_url: String,
        full: bool,
    },
    SubmitRender {
        generation: u64,
        script: Vec<ScriptLine>,
        settings: RenderSettings,
    },
    StartStatusPoll {
        stage: StageKind,
        generation: u64,
        job_id: String,
    },
    StartArtifactProbe {
        generation: u64,
        media_id: String,
    },
    CancelStage {
        stage: StageKind,
    },
    CancelAll,
}

/// Handle to the engine thread: commands in, events out.
///
/// The thread owns a tokio runtime; polling loops run as tasks on it, each
/// guarded by a per-stage [`CancellationToken`]. Starting a new loop for a
/// stage cancels the previous one, so at most one loop per stage is ever
/// live.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, StageError> {
        let http = build_http_client(&config)?;
        let client = ReqwestStageClient::new(http.clone(), config.clone());

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_warn!("engine runtime failed to start: {err}");
                    return;
                }
            };
            let mut worker = EngineWorker {
                config,
                http,
                client,
                event_tx,
                tokens: HashMap::new(),
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
            // Handle dropped; cancel whatever is still running.
            worker.cancel_all();
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn dispatch(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

struct EngineWorker {
    config: EngineConfig,
    http: reqwest::Client,
    client: ReqwestStageClient,
    event_tx: mpsc::Sender<EngineEvent>,
    tokens: HashMap<StageKind, CancellationToken>,
}

impl EngineWorker {
    fn handle(&mut self, runtime: &tokio::runtime::Runtime, command: EngineCommand) {
        match command {
            EngineCommand::SubmitSummary {
                stage,
                generation,
                source_url,
                full,
            } => {
                engine_info!("submit {stage} gen={generation} url={source_url}");
                let request = SummarySubmitRequest {
                    url: source_url,
                    full,
                    // The preview pass is quick enough to answer inline; the
                    // full pass prefers an async handle.
                    run_async: full,
                    model_id: self.config.model_id.clone(),
                    temperature: self.config.temperature,
                };
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let outcome = client.submit_summary(request).await;
                    let _ = event_tx.send(EngineEvent::SubmitResolved {
                        stage,
                        generation,
                        outcome,
                    });
                });
            }
            EngineCommand::SubmitRender {
                generation,
                script,
                settings,
            } => {
                engine_info!(
                    "submit render gen={generation} highlights={}",
                    script.len()
                );
                let request = RenderSubmitRequest {
                    highlights: script
                        .into_iter()
                        .map(|line| RenderHighlight {
                            order: line.order,
                            text: line.text,
                            image: line.image,
                        })
                        .collect(),
                    voice: settings.voice,
                    aspect_ratio: settings.aspect_ratio,
                    transition_style: settings.transition_style,
                    subtitle_chunk_size: settings.subtitle_chunk_size,
                    run_async: true,
                };
                let client = self.client.clone();
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    let outcome = client.submit_render(request).await;
                    let _ = event_tx.send(EngineEvent::SubmitResolved {
                        stage: StageKind::Render,
                        generation,
                        outcome,
                    });
                });
            }
            EngineCommand::StartStatusPoll {
                stage,
                generation,
                job_id,
            } => {
                engine_info!("start status poll {stage} gen={generation} job={job_id}");
                let token = self.replace_token(stage);
                let kind = match stage {
                    StageKind::Extract | StageKind::Summarize => StatusKind::Summary {
                        media: self.config.media.clone(),
                    },
                    StageKind::Render | StageKind::Probe => StatusKind::Render {
                        job_id: job_id.clone(),
                    },
                };
                let prober = StatusProber::new(
                    self.http.clone(),
                    self.config.status_url(stage, &job_id),
                    kind,
                );
                let poll_config = self.config.poll_config(stage);
                let sink = ChannelAttemptSink {
                    event_tx: self.event_tx.clone(),
                    stage,
                    generation,
                };
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    if let Some(outcome) =
                        run_poll_loop(&prober, poll_config, &token, &sink).await
                    {
                        let _ = event_tx.send(EngineEvent::PollFinished {
                            stage,
                            generation,
                            outcome,
                        });
                    }
                });
            }
            EngineCommand::StartArtifactProbe {
                generation,
                media_id,
            } => {
                engine_info!("start artifact probe gen={generation} media={media_id}");
                let token = self.replace_token(StageKind::Probe);
                let prober = ArtifactProber::new(
                    self.http.clone(),
                    self.config.artifact_url(&media_id),
                    media_id,
                );
                let poll_config = self.config.poll_config(StageKind::Probe);
                let sink = ChannelAttemptSink {
                    event_tx: self.event_tx.clone(),
                    stage: StageKind::Probe,
                    generation,
                };
                let event_tx = self.event_tx.clone();
                runtime.spawn(async move {
                    if let Some(outcome) =
                        run_poll_loop(&prober, poll_config, &token, &sink).await
                    {
                        let _ = event_tx.send(EngineEvent::PollFinished {
                            stage: StageKind::Probe,
                            generation,
                            outcome,
                        });
                    }
                });
            }
            EngineCommand::CancelStage { stage } => {
                if let Some(token) = self.tokens.remove(&stage) {
                    engine_info!("cancel {stage} loop");
                    token.cancel();
                }
            }
            EngineCommand::CancelAll => self.cancel_all(),
        }
    }

    /// Cancels any live loop for the stage and installs a fresh token.
    fn replace_token(&mut self, stage: StageKind) -> CancellationToken {
        if let Some(previous) = self.tokens.remove(&stage) {
            previous.cancel();
        }
        let token = CancellationToken::new();
        self.tokens.insert(stage, token.clone());
        token
    }

    fn cancel_all(&mut self) {
        for (stage, token) in self.tokens.drain() {
            engine_info!("cancel {stage} loop");
            token.cancel();
        }
    }
}

struct ChannelAttemptSink {
    event_tx: mpsc::Sender<EngineEvent>,
    stage: StageKind,
    generation: u64,
}

impl AttemptSink for ChannelAttemptSink {
    fn attempted(&self, attempts: u32) {
        let _ = self.event_tx.send(EngineEvent::ProbeAttempted {
            stage: self.stage,
            generation: self.generation,
            attempts,
        });
    }
}
