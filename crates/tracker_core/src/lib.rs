//! Tracker core: job model, status normalization and pure state machines.
mod collection;
mod job;
mod launch;
mod normalize;
mod poller;

pub use collection::{
    entry_status, group_episodes_by_status, has_active_entries, CollectionEntry,
    CollectionRefreshPolicy, EpisodeStatusCounts, EpisodeStatusGroups, EpisodeSummary,
    DEFAULT_COLLECTION_INTERVAL,
};
pub use job::{JobHandle, JobKind, JobSnapshot, JobStatus, Progress, Stats};
pub use launch::{
    LaunchRequest, LaunchValidationError, PodcastGenerationRequest, RebuildMode, RebuildRequest,
};
pub use normalize::{normalize, parse_timestamp};
pub use poller::{
    PollSettings, PollerError, PollerPhase, PollerState, TickOutcome, DEFAULT_POLL_INTERVAL,
    MIN_POLL_INTERVAL,
};
