use std::fmt;

use crate::{EpochMs, StageResult};

/// One named unit of remote work. Extract and Summarize share the summary
/// endpoint (`full: false` vs `full: true`); Probe is the artifact-existence
/// phase and never submits anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Extract,
    Summarize,
    Render,
    Probe,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Extract, Stage::Summarize, Stage::Render, Stage::Probe];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Summarize => write!(f, "summarize"),
            Stage::Render => write!(f, "render"),
            Stage::Probe => write!(f, "probe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Polling,
    Completed,
    Failed,
    TimedOut,
}

/// One outstanding invocation of a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Opaque handle assigned by the remote stage; empty until assigned.
    pub id: String,
    pub stage: Stage,
    pub status: JobStatus,
    pub submitted_at: EpochMs,
    pub last_polled_at: Option<EpochMs>,
    pub attempts: u32,
    pub result: Option<StageResult>,
    pub error: Option<String>,
}

impl Job {
    pub(crate) fn submitted(stage: Stage, at: EpochMs) -> Self {
        Self {
            id: String::new(),
            stage,
            status: JobStatus::Submitted,
            submitted_at: at,
            last_polled_at: None,
            attempts: 0,
            result: None,
            error: None,
        }
    }

    /// A live job is one that a new submission for the same stage must cancel.
    pub fn is_live(&self) -> bool {
        matches!(self.status, JobStatus::Submitted | JobStatus::Polling)
    }
}

/// Terminal stage condition, kept distinct so callers can offer "retry" for
/// timeouts instead of treating them as hard failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageFault {
    Failed(String),
    TimedOut,
}

impl fmt::Display for StageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageFault::Failed(reason) => write!(f, "failed: {reason}"),
            StageFault::TimedOut => write!(f, "timed out"),
        }
    }
}
