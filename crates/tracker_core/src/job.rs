use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// Kind of long-running backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    EmbeddingRebuild,
    PodcastGeneration,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::EmbeddingRebuild => write!(f, "embedding rebuild"),
            JobKind::PodcastGeneration => write!(f, "podcast generation"),
        }
    }
}

/// Identifies a job accepted by the backend. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    id: String,
    kind: JobKind,
}

impl JobHandle {
    pub fn new(id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Maps a backend status word onto the canonical vocabulary.
    ///
    /// Returns `None` for words outside the vocabulary (e.g. `unknown`).
    pub fn parse(raw: &str) -> Option<Self> {
        let word = raw.trim().to_ascii_lowercase();
        match word.as_str() {
            "queued" | "pending" | "submitted" | "new" => Some(JobStatus::Queued),
            "running" | "processing" | "in_progress" | "started" => Some(JobStatus::Running),
            "completed" | "complete" | "succeeded" | "success" | "done" => {
                Some(JobStatus::Completed)
            }
            "failed" | "error" | "canceled" | "cancelled" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Canonical progress. `percentage` is always finite and within `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Progress {
    pub total_items: Option<u64>,
    pub processed_items: Option<u64>,
    pub percentage: f64,
}

impl Progress {
    /// Human readable form, e.g. `10/50 items (20.0%)`.
    pub fn display(&self) -> String {
        format!(
            "{}/{} items ({:.1}%)",
            self.processed_items.unwrap_or(0),
            self.total_items.unwrap_or(0),
            self.percentage
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stats {
    /// Counts keyed by canonical field name, e.g. `sources_processed`.
    pub per_category_counts: BTreeMap<String, u64>,
    pub failed_items: u64,
    pub processing_time_seconds: Option<f64>,
}

impl Stats {
    /// Looks up `{category}_processed`, e.g. `processed("notes")`.
    pub fn processed(&self, category: &str) -> Option<u64> {
        self.per_category_counts
            .get(&format!("{category}_processed"))
            .copied()
    }
}

/// One normalized observation of a job. A fresh value is produced per poll tick.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub handle: JobHandle,
    pub status: JobStatus,
    pub progress: Option<Progress>,
    pub stats: Option<Stats>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl JobSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
