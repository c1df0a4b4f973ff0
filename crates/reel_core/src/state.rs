use std::collections::BTreeMap;

use crate::view_model::{JobRowView, PipelineView};
use crate::{
    EpochMs, Highlight, ImageRef, Job, JobStatus, PipelineArtifact, Stage, StageFault,
    StageResult, SummaryOutcome, TITLE_ORDER,
};

/// Single-owner store for the live pipeline run.
///
/// Only `update` mutates this; everything the engine reports comes back as a
/// message, so there is exactly one thread of control touching the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineState {
    artifact: PipelineArtifact,
    jobs: BTreeMap<Stage, Job>,
    faults: BTreeMap<Stage, StageFault>,
    generations: BTreeMap<Stage, u64>,
    /// Union of every image any completed stage has offered, keyed by
    /// resolved URL. Grows monotonically within a run.
    image_pool: BTreeMap<String, ImageRef>,
    running: bool,
    dirty: bool,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifact(&self) -> &PipelineArtifact {
        &self.artifact
    }

    pub fn job(&self, stage: Stage) -> Option<&Job> {
        self.jobs.get(&stage)
    }

    pub fn fault(&self, stage: Stage) -> Option<&StageFault> {
        self.faults.get(&stage)
    }

    pub fn has_run(&self) -> bool {
        self.running
    }

    /// Returns the dirty flag and clears it; used to coalesce rendering.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> PipelineView {
        PipelineView {
            source_url: self.artifact.source_url.clone(),
            title: self.artifact.title.clone(),
            editable_highlights: self
                .artifact
                .highlights
                .iter()
                .filter(|h| h.order != TITLE_ORDER)
                .cloned()
                .collect(),
            rendered_media_id: self.artifact.rendered_media_id.clone(),
            jobs: self
                .jobs
                .values()
                .map(|job| JobRowView {
                    stage: job.stage,
                    job_id: job.id.clone(),
                    status: job.status,
                    attempts: job.attempts,
                    error: job.error.clone(),
                })
                .collect(),
            faults: self
                .faults
                .iter()
                .map(|(stage, fault)| (*stage, fault.clone()))
                .collect(),
            known_images: self.image_pool.values().cloned().collect(),
            dirty: self.dirty,
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // --- run lifecycle ---

    pub(crate) fn begin_run(&mut self, source_url: String) {
        *self = Self {
            artifact: PipelineArtifact {
                source_url,
                ..PipelineArtifact::default()
            },
            // Generations survive the reset so events from loops belonging to
            // the previous run can never match a fresh submission.
            generations: advanced_generations(&self.generations),
            running: true,
            dirty: true,
            ..Self::default()
        };
    }

    pub(crate) fn abandon_run(&mut self) {
        *self = Self {
            generations: advanced_generations(&self.generations),
            dirty: true,
            ..Self::default()
        };
    }

    // --- generation bookkeeping ---

    pub fn current_generation(&self, stage: Stage) -> u64 {
        self.generations.get(&stage).copied().unwrap_or(0)
    }

    pub(crate) fn bump_generation(&mut self, stage: Stage) -> u64 {
        let next = self.current_generation(stage) + 1;
        self.generations.insert(stage, next);
        next
    }

    pub fn is_current(&self, stage: Stage, generation: u64) -> bool {
        self.current_generation(stage) == generation
    }

    // --- job transitions ---

    pub(crate) fn start_job(&mut self, stage: Stage, at: EpochMs) {
        self.jobs.insert(stage, Job::submitted(stage, at));
        self.faults.remove(&stage);
        self.mark_dirty();
    }

    pub(crate) fn assign_job_handle(&mut self, stage: Stage, job_id: String) {
        if let Some(job) = self.jobs.get_mut(&stage) {
            job.id = job_id;
        }
        self.mark_dirty();
    }

    pub(crate) fn record_probe(&mut self, stage: Stage, at: EpochMs) {
        if let Some(job) = self.jobs.get_mut(&stage) {
            job.status = JobStatus::Polling;
            job.attempts += 1;
            job.last_polled_at = Some(at);
        }
        self.mark_dirty();
    }

    pub(crate) fn complete_job(&mut self, stage: Stage, result: StageResult) {
        if let Some(job) = self.jobs.get_mut(&stage) {
            job.status = JobStatus::Completed;
            job.result = Some(result);
            job.error = None;
        }
        self.mark_dirty();
    }

    pub(crate) fn fail_job(&mut self, stage: Stage, error: String) {
        if let Some(job) = self.jobs.get_mut(&stage) {
            job.status = JobStatus::Failed;
            job.error = Some(error.clone());
        }
        self.faults.insert(stage, StageFault::Failed(error));
        self.mark_dirty();
    }

    pub(crate) fn time_out_job(&mut self, stage: Stage) {
        if let Some(job) = self.jobs.get_mut(&stage) {
            job.status = JobStatus::TimedOut;
        }
        self.faults.insert(stage, StageFault::TimedOut);
        self.mark_dirty();
    }

    // --- artifact merges ---

    /// Replaces title and highlights wholesale from a summary reply. The
    /// first highlight (order 0) carries the document title; bullets follow
    /// from order 1 and default to their first candidate image. Candidate
    /// images from every completion accumulate in the pool.
    pub(crate) fn apply_summary(&mut self, outcome: SummaryOutcome) {
        for bullet in &outcome.bullets {
            for image in &bullet.images {
                self.image_pool
                    .entry(image.url.clone())
                    .or_insert_with(|| image.clone());
            }
        }

        let mut highlights = Vec::with_capacity(outcome.bullets.len() + 1);
        highlights.push(Highlight {
            order: TITLE_ORDER,
            text: outcome.title.clone(),
            image: None,
        });
        for (index, bullet) in outcome.bullets.into_iter().enumerate() {
            highlights.push(Highlight {
                order: index as u32 + 1,
                text: bullet.text,
                image: bullet.images.into_iter().next(),
            });
        }

        self.artifact = PipelineArtifact {
            source_url: self.artifact.source_url.clone(),
            title: outcome.title,
            highlights,
            rendered_media_id: self.artifact.rendered_media_id.clone(),
        };
        self.mark_dirty();
    }

    pub(crate) fn set_rendered_media(&mut self, media_id: String) {
        self.artifact = PipelineArtifact {
            rendered_media_id: Some(media_id),
            ..self.artifact.clone()
        };
        self.mark_dirty();
    }

    // --- highlight edits ---

    pub(crate) fn set_highlight_text(&mut self, order: u32, text: String) {
        if let Some(h) = self.highlight_mut(order) {
            h.text = text;
            self.mark_dirty();
        }
    }

    /// Selecting an image only changes this highlight; the pool keeps every
    /// image selectable for the others.
    pub(crate) fn select_highlight_image(&mut self, order: u32, image_url: Option<String>) {
        let image = image_url.and_then(|url| self.image_pool.get(&url).cloned());
        if let Some(h) = self.highlight_mut(order) {
            h.image = image;
            self.mark_dirty();
        }
    }

    pub(crate) fn remove_highlight(&mut self, order: u32) {
        // The title row is not part of the editable list.
        if order == TITLE_ORDER {
            return;
        }
        let before = self.artifact.highlights.len();
        self.artifact.highlights.retain(|h| h.order != order);
        if self.artifact.highlights.len() != before {
            self.mark_dirty();
        }
    }

    fn highlight_mut(&mut self, order: u32) -> Option<&mut Highlight> {
        self.artifact.highlights.iter_mut().find(|h| h.order == order)
    }
}

/// Carry the per-stage counters forward so a reset can never reissue a
/// generation that a still-running loop holds.
fn advanced_generations(generations: &BTreeMap<Stage, u64>) -> BTreeMap<Stage, u64> {
    Stage::ALL
        .iter()
        .map(|stage| (*stage, generations.get(stage).copied().unwrap_or(0) + 1))
        .collect()
}
