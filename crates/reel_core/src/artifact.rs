//! Shared pipeline artifact types.

/// Milliseconds since the Unix epoch, supplied by the caller so this crate
/// stays free of clock dependencies.
pub type EpochMs = i64;

/// Order index reserved for the document-title highlight.
pub const TITLE_ORDER: u32 = 0;

/// A selectable image, keyed across the pipeline by its resolved `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Resolved, directly fetchable HTTP(S) address.
    pub url: String,
    /// Canonical location-independent storage identifier.
    pub storage_key: String,
    pub title: String,
    pub caption: String,
}

/// One line of the highlight script. `order` is a stable identity and is not
/// renumbered when other highlights are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub order: u32,
    pub text: String,
    pub image: Option<ImageRef>,
}

/// The single evolving result of a pipeline run. Replaced wholesale on every
/// stage merge so readers always observe a consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineArtifact {
    pub source_url: String,
    pub title: String,
    pub highlights: Vec<Highlight>,
    /// Set only once the artifact-existence probe confirms the rendered
    /// output, never on render-job completion alone.
    pub rendered_media_id: Option<String>,
}

/// One summarizer bullet with its candidate images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryBullet {
    pub text: String,
    pub images: Vec<ImageRef>,
}

/// Decoded reply of the extract/summarize stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub title: String,
    pub bullets: Vec<SummaryBullet>,
}

/// Stage-specific completion payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    Summary(SummaryOutcome),
    /// The render job finished on the remote side. The artifact itself is
    /// confirmed separately by the existence probe.
    RenderFinished { job_id: String },
    ArtifactReady { media_id: String },
}

/// Rendering parameters forwarded verbatim to the render stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub voice: String,
    pub aspect_ratio: String,
    pub transition_style: String,
    pub subtitle_chunk_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            voice: "narrator".to_string(),
            aspect_ratio: "16:9".to_string(),
            transition_style: "fade".to_string(),
            subtitle_chunk_size: 6,
        }
    }
}
