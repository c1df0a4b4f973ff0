//! Serde shapes for the stage endpoints. Everything is converted into the
//! typed [`crate::StageOutput`] vocabulary at this boundary; nothing past it
//! inspects raw JSON.

use serde::{Deserialize, Serialize};

use crate::config::MediaLocation;
use crate::resolve::resolve_storage_url;
use crate::types::{ImageAsset, SummaryBulletOutput, SummaryOutput};

/// Submit body of the extract/summarize stage.
#[derive(Debug, Clone, Serialize)]
pub struct SummarySubmitRequest {
    pub url: String,
    /// `false` requests the fast title/preview pass.
    pub full: bool,
    #[serde(rename = "async")]
    pub run_async: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Immediate reply of the extract/summarize stage.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryReply {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<BulletReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulletReply {
    pub text: String,
    #[serde(default)]
    pub image_url: Vec<ImageReply>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageReply {
    pub image_url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Async acceptance handle shared by both submit endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AsyncAccepted {
    pub job_id: String,
}

/// Status-poll reply shared by both stages.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub status: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Submit body of the render stage.
#[derive(Debug, Clone, Serialize)]
pub struct RenderSubmitRequest {
    pub highlights: Vec<RenderHighlight>,
    pub voice: String,
    pub aspect_ratio: String,
    pub transition_style: String,
    pub subtitle_chunk_size: u32,
    #[serde(rename = "async")]
    pub run_async: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderHighlight {
    pub order: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl SummaryReply {
    /// Converts the wire reply into engine output, resolving every image
    /// reference to a fetchable address. The original reference is kept as
    /// the storage key.
    pub fn into_output(self, media: &MediaLocation) -> SummaryOutput {
        SummaryOutput {
            title: self.title,
            bullets: self
                .bullets
                .into_iter()
                .map(|bullet| SummaryBulletOutput {
                    text: bullet.text,
                    images: bullet
                        .image_url
                        .into_iter()
                        .map(|image| ImageAsset {
                            url: resolve_storage_url(&image.image_url, media),
                            storage_key: image.image_url,
                            title: image.title.unwrap_or_default(),
                            caption: image.caption.unwrap_or_default(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
