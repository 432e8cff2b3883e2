//! Tracker engine: HTTP access and async drivers for long-running jobs.
mod api;
mod launcher;
mod lifecycle;
mod poller;
mod sink;
mod types;

pub use api::{ClientSettings, EpisodeSource, JobApi, JobStarter, StatusSource};
pub use launcher::{ActiveJob, JobLauncher, LaunchError};
pub use lifecycle::PollingLifecycleManager;
pub use poller::JobPoller;
pub use sink::{ChannelSnapshotSink, SnapshotSink};
pub use types::{ApiError, ApiFailureKind, LaunchReceipt, TrackerEvent};
