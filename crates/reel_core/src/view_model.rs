use crate::{Highlight, ImageRef, JobStatus, Stage, StageFault};

/// Read model for one stage's job slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub stage: Stage,
    pub job_id: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub error: Option<String>,
}

/// Aggregate read model of the current run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineView {
    pub source_url: String,
    pub title: String,
    /// Highlights the user may edit; the order-0 title row is excluded.
    pub editable_highlights: Vec<Highlight>,
    pub rendered_media_id: Option<String>,
    pub jobs: Vec<JobRowView>,
    pub faults: Vec<(Stage, StageFault)>,
    /// Every image any stage has offered so far, sorted by resolved URL.
    pub known_images: Vec<ImageRef>,
    pub dirty: bool,
}
