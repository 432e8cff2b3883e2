use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::JobKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchValidationError {
    #[error("no content selected for {kind}")]
    EmptySelection { kind: JobKind },
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildMode {
    /// Re-embed only items that already have embeddings.
    #[default]
    Existing,
    /// Re-embed everything, creating missing embeddings.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildRequest {
    pub mode: RebuildMode,
    pub include_sources: bool,
    pub include_notes: bool,
    pub include_insights: bool,
}

impl Default for RebuildRequest {
    fn default() -> Self {
        Self {
            mode: RebuildMode::Existing,
            include_sources: true,
            include_notes: true,
            include_insights: true,
        }
    }
}

impl RebuildRequest {
    pub fn selects_anything(&self) -> bool {
        self.include_sources || self.include_notes || self.include_insights
    }
}

/// `content` is the serialized source/note selection built by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PodcastGenerationRequest {
    pub episode_profile: String,
    pub speaker_profile: String,
    pub episode_name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub briefing_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchRequest {
    Rebuild(RebuildRequest),
    Podcast(PodcastGenerationRequest),
}

impl LaunchRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            LaunchRequest::Rebuild(_) => JobKind::EmbeddingRebuild,
            LaunchRequest::Podcast(_) => JobKind::PodcastGeneration,
        }
    }

    /// Checks that the request selects work and returns it in submission form.
    ///
    /// Podcast text fields are trimmed and a blank briefing suffix is dropped.
    pub fn validated(&self) -> Result<LaunchRequest, LaunchValidationError> {
        match self {
            LaunchRequest::Rebuild(request) => {
                if !request.selects_anything() {
                    return Err(LaunchValidationError::EmptySelection {
                        kind: JobKind::EmbeddingRebuild,
                    });
                }
                Ok(LaunchRequest::Rebuild(request.clone()))
            }
            LaunchRequest::Podcast(request) => {
                if request.content.trim().is_empty() {
                    return Err(LaunchValidationError::EmptySelection {
                        kind: JobKind::PodcastGeneration,
                    });
                }
                let episode_profile = required(&request.episode_profile, "episode_profile")?;
                let speaker_profile = required(&request.speaker_profile, "speaker_profile")?;
                let episode_name = required(&request.episode_name, "episode_name")?;
                Ok(LaunchRequest::Podcast(PodcastGenerationRequest {
                    episode_profile,
                    speaker_profile,
                    episode_name,
                    content: request.content.clone(),
                    notebook_id: request
                        .notebook_id
                        .as_deref()
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(ToOwned::to_owned),
                    briefing_suffix: request
                        .briefing_suffix
                        .as_deref()
                        .map(str::trim)
                        .filter(|text| !text.is_empty())
                        .map(ToOwned::to_owned),
                }))
            }
        }
    }

    /// JSON body for the launch endpoint.
    pub fn body(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            LaunchRequest::Rebuild(request) => serde_json::to_value(request),
            LaunchRequest::Podcast(request) => serde_json::to_value(request),
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, LaunchValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(LaunchValidationError::MissingField { field })
    } else {
        Ok(trimmed.to_owned())
    }
}
