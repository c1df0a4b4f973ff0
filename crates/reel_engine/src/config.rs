use std::time::Duration;

use thiserror::Error;

use crate::resolve::resolve_storage_url;
use crate::scheduler::PollConfig;
use crate::types::StageKind;

/// Environment variables consumed by [`EngineConfig::from_env`].
pub const ENV_SUMMARY_ENDPOINT: &str = "REEL_SUMMARIZE_ENDPOINT";
pub const ENV_RENDER_ENDPOINT: &str = "REEL_RENDER_ENDPOINT";
pub const ENV_MEDIA_BASE_URL: &str = "REEL_MEDIA_BASE_URL";
pub const ENV_MEDIA_BUCKET: &str = "REEL_MEDIA_BUCKET";
pub const ENV_STORAGE_HOST: &str = "REEL_STORAGE_HOST";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing endpoint address: {0} is not set")]
    MissingEndpoint(&'static str),
}

/// Where rendered media and images live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLocation {
    /// Configured HTTP(S) base substituted for the known bucket, if any.
    pub base_url: Option<String>,
    pub bucket: String,
    pub storage_host: String,
}

impl Default for MediaLocation {
    fn default() -> Self {
        Self {
            base_url: None,
            bucket: "reel-media".to_string(),
            storage_host: "s3.amazonaws.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Base address of the extract/summarize service.
    pub summary_endpoint: String,
    /// Base address of the render service.
    pub render_endpoint: String,
    pub media: MediaLocation,
    pub model_id: Option<String>,
    pub temperature: Option<f32>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub summary_poll: PollConfig,
    pub render_poll: PollConfig,
    pub artifact_poll: PollConfig,
}

impl EngineConfig {
    pub fn new(summary_endpoint: impl Into<String>, render_endpoint: impl Into<String>) -> Self {
        Self {
            summary_endpoint: summary_endpoint.into(),
            render_endpoint: render_endpoint.into(),
            media: MediaLocation::default(),
            model_id: None,
            temperature: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            // Job-status polling keeps a long leash; the artifact check is a
            // short existence probe.
            summary_poll: PollConfig::new(Duration::from_secs(10), Duration::from_secs(300)),
            render_poll: PollConfig::new(Duration::from_secs(5), Duration::from_secs(180)),
            artifact_poll: PollConfig::new(Duration::from_secs(5), Duration::from_secs(30)),
        }
    }

    /// Reads the configuration from the environment. Missing required
    /// endpoints fail here, before any submission is attempted.
    pub fn from_env() -> Result<Self, ConfigError> {
        let summary_endpoint = require_env(ENV_SUMMARY_ENDPOINT)?;
        let render_endpoint = require_env(ENV_RENDER_ENDPOINT)?;

        let mut config = Self::new(summary_endpoint, render_endpoint);
        config.media.base_url = read_env(ENV_MEDIA_BASE_URL);
        if let Some(bucket) = read_env(ENV_MEDIA_BUCKET) {
            config.media.bucket = bucket;
        }
        if let Some(host) = read_env(ENV_STORAGE_HOST) {
            config.media.storage_host = host;
        }
        Ok(config)
    }

    pub fn submit_url(&self, stage: StageKind) -> String {
        match stage {
            StageKind::Extract | StageKind::Summarize => {
                format!("{}/summary", self.summary_endpoint.trim_end_matches('/'))
            }
            StageKind::Render | StageKind::Probe => {
                format!("{}/render", self.render_endpoint.trim_end_matches('/'))
            }
        }
    }

    pub fn status_url(&self, stage: StageKind, job_id: &str) -> String {
        let base = match stage {
            StageKind::Extract | StageKind::Summarize => &self.summary_endpoint,
            StageKind::Render | StageKind::Probe => &self.render_endpoint,
        };
        format!("{}/status/{}", base.trim_end_matches('/'), job_id)
    }

    /// Deterministic address of the rendered artifact for a render job. The
    /// renderer publishes under `output_videos/` in the media bucket.
    pub fn artifact_url(&self, media_id: &str) -> String {
        let reference = format!("s3://{}/output_videos/{}.mp4", self.media.bucket, media_id);
        resolve_storage_url(&reference, &self.media)
    }

    pub fn poll_config(&self, stage: StageKind) -> PollConfig {
        match stage {
            StageKind::Extract | StageKind::Summarize => self.summary_poll,
            StageKind::Render => self.render_poll,
            StageKind::Probe => self.artifact_poll,
        }
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    read_env(name).ok_or(ConfigError::MissingEndpoint(name))
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_url_uses_output_videos_key() {
        let mut config = EngineConfig::new("http://summary.test", "http://render.test");
        config.media.base_url = Some("https://cdn.example".to_string());
        assert_eq!(
            config.artifact_url("J1"),
            "https://cdn.example/output_videos/J1.mp4"
        );
    }

    #[test]
    fn from_env_fails_fast_on_missing_endpoints() {
        std::env::remove_var(ENV_SUMMARY_ENDPOINT);
        std::env::remove_var(ENV_RENDER_ENDPOINT);
        assert_eq!(
            EngineConfig::from_env().unwrap_err(),
            ConfigError::MissingEndpoint(ENV_SUMMARY_ENDPOINT)
        );

        std::env::set_var(ENV_SUMMARY_ENDPOINT, "http://summary.test");
        assert_eq!(
            EngineConfig::from_env().unwrap_err(),
            ConfigError::MissingEndpoint(ENV_RENDER_ENDPOINT)
        );

        std::env::set_var(ENV_RENDER_ENDPOINT, "http://render.test");
        std::env::set_var(ENV_MEDIA_BUCKET, "my-bucket");
        let config = EngineConfig::from_env().expect("config");
        assert_eq!(config.summary_endpoint, "http://summary.test");
        assert_eq!(config.media.bucket, "my-bucket");

        std::env::remove_var(ENV_SUMMARY_ENDPOINT);
        std::env::remove_var(ENV_RENDER_ENDPOINT);
        std::env::remove_var(ENV_MEDIA_BUCKET);
    }

    #[test]
    fn status_url_is_stage_scoped() {
        let config = EngineConfig::new("http://summary.test/", "http://render.test");
        assert_eq!(
            config.status_url(StageKind::Summarize, "abc"),
            "http://summary.test/status/abc"
        );
        assert_eq!(
            config.status_url(StageKind::Render, "J1"),
            "http://render.test/status/J1"
        );
    }
}
