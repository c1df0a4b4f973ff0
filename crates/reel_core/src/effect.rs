use crate::{Highlight, RenderOptions, Stage};

/// I/O the update function asks the engine to perform. Effects carry the
/// generation they were issued under so late replies can be matched against
/// the current one and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Stop any live polling loop for the stage before new work starts.
    CancelStage { stage: Stage },
    /// Stop every live loop; used on run start and abandonment.
    CancelAll,
    /// Submit to the summary endpoint. `full` distinguishes the Extract
    /// preview pass from the Summarize pass.
    SubmitSummary {
        stage: Stage,
        generation: u64,
        source_url: String,
        full: bool,
    },
    /// Submit the highlight script to the render endpoint.
    SubmitRender {
        generation: u64,
        script: Vec<Highlight>,
        options: RenderOptions,
    },
    /// Start the status-polling loop for an accepted async job.
    StartStatusPolling {
        stage: Stage,
        generation: u64,
        job_id: String,
    },
    /// Start the artifact-existence loop for a finished render job.
    StartArtifactProbe { generation: u64, media_id: String },
}
