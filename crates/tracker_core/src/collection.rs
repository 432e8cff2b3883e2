use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::JobStatus;

/// Refetch cadence observed for the episode list while work is outstanding.
pub const DEFAULT_COLLECTION_INTERVAL: Duration = Duration::from_millis(15_000);

/// An item of an already-fetched collection that carries a job status word.
pub trait CollectionEntry {
    fn raw_status(&self) -> Option<&str>;
}

/// Canonical status of an entry, if its word is in the vocabulary.
pub fn entry_status<E: CollectionEntry + ?Sized>(entry: &E) -> Option<JobStatus> {
    entry.raw_status().and_then(JobStatus::parse)
}

/// Minimal view of a podcast episode as returned by the episode list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job_status: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub audio_file: Option<String>,
}

impl CollectionEntry for EpisodeSummary {
    fn raw_status(&self) -> Option<&str> {
        self.job_status.as_deref()
    }
}

impl CollectionEntry for JobStatus {
    fn raw_status(&self) -> Option<&str> {
        Some(match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        })
    }
}

impl CollectionEntry for &str {
    fn raw_status(&self) -> Option<&str> {
        Some(self)
    }
}

/// Decides whether a list view should keep refetching.
///
/// Stateless: it is re-evaluated against the latest fetched collection and
/// owns no timer of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionRefreshPolicy {
    pub interval: Duration,
    pub auto_refresh: bool,
}

impl Default for CollectionRefreshPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_COLLECTION_INTERVAL,
            auto_refresh: true,
        }
    }
}

impl CollectionRefreshPolicy {
    /// `Some(interval)` while any entry is queued or running, `None` otherwise.
    pub fn next_interval<E: CollectionEntry>(&self, entries: &[E]) -> Option<Duration> {
        if !self.auto_refresh || entries.is_empty() {
            return None;
        }
        has_active_entries(entries).then_some(self.interval)
    }
}

/// Unknown or missing statuses do not count as active.
pub fn has_active_entries<E: CollectionEntry>(entries: &[E]) -> bool {
    entries
        .iter()
        .any(|entry| entry_status(entry).is_some_and(JobStatus::is_active))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeStatusGroups<'a, E> {
    pub running: Vec<&'a E>,
    pub completed: Vec<&'a E>,
    pub failed: Vec<&'a E>,
    pub pending: Vec<&'a E>,
}

impl<E> EpisodeStatusGroups<'_, E> {
    pub fn counts(&self) -> EpisodeStatusCounts {
        EpisodeStatusCounts {
            total: self.running.len()
                + self.completed.len()
                + self.failed.len()
                + self.pending.len(),
            running: self.running.len(),
            completed: self.completed.len(),
            failed: self.failed.len(),
            pending: self.pending.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpisodeStatusCounts {
    pub total: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Buckets entries for display, preserving their order.
///
/// Queued and unrecognized statuses land in `pending`.
pub fn group_episodes_by_status<E: CollectionEntry>(entries: &[E]) -> EpisodeStatusGroups<'_, E> {
    let mut groups = EpisodeStatusGroups {
        running: Vec::new(),
        completed: Vec::new(),
        failed: Vec::new(),
        pending: Vec::new(),
    };
    for entry in entries {
        match entry_status(entry) {
            Some(JobStatus::Running) => groups.running.push(entry),
            Some(JobStatus::Completed) => groups.completed.push(entry),
            Some(JobStatus::Failed) => groups.failed.push(entry),
            Some(JobStatus::Queued) | None => groups.pending.push(entry),
        }
    }
    groups
}
