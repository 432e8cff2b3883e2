use std::fmt;
use std::sync::Arc;

use tracker_core::{JobHandle, JobSnapshot, PollerPhase};

/// Events delivered to a [`crate::SnapshotSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A freshly normalized observation of the job.
    Snapshot(Arc<JobSnapshot>),
    /// Polling ended, either on a terminal snapshot or through cancellation.
    Stopped {
        handle: JobHandle,
        phase: PollerPhase,
    },
}

/// What the backend said when it accepted a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReceipt {
    pub job_id: String,
    pub message: Option<String>,
    pub estimated_items: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: ApiFailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: ApiFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    MissingJobId,
}

impl fmt::Display for ApiFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailureKind::InvalidUrl => write!(f, "invalid url"),
            ApiFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ApiFailureKind::Timeout => write!(f, "timeout"),
            ApiFailureKind::Network => write!(f, "network error"),
            ApiFailureKind::Decode => write!(f, "malformed response"),
            ApiFailureKind::MissingJobId => write!(f, "response carried no job id"),
        }
    }
}
