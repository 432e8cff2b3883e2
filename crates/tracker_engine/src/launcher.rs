use std::sync::Arc;

use thiserror::Error;
use tracker_core::{
    JobHandle, JobKind, LaunchRequest, LaunchValidationError, PollSettings, PollerError,
};
use tracker_logging::{tracker_error, tracker_info};

use crate::{ApiError, JobApi, JobPoller, JobStarter, LaunchReceipt, SnapshotSink, StatusSource};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("nothing selected for {kind}")]
    EmptySelection { kind: JobKind },
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("failed to start {kind}: {source}")]
    Request {
        kind: JobKind,
        #[source]
        source: ApiError,
    },
    #[error(transparent)]
    Poller(#[from] PollerError),
}

impl From<LaunchValidationError> for LaunchError {
    fn from(err: LaunchValidationError) -> Self {
        match err {
            LaunchValidationError::EmptySelection { kind } => LaunchError::EmptySelection { kind },
            LaunchValidationError::MissingField { field } => LaunchError::MissingField { field },
        }
    }
}

/// A job the backend accepted, together with the poller watching it.
#[derive(Clone)]
pub struct ActiveJob {
    pub handle: JobHandle,
    pub receipt: LaunchReceipt,
    pub poller: JobPoller,
}

/// Submits jobs and hands each accepted one to a fresh [`JobPoller`].
#[derive(Clone)]
pub struct JobLauncher {
    starter: Arc<dyn JobStarter>,
    source: Arc<dyn StatusSource>,
    settings: PollSettings,
}

impl JobLauncher {
    pub fn new(
        starter: Arc<dyn JobStarter>,
        source: Arc<dyn StatusSource>,
        settings: PollSettings,
    ) -> Self {
        Self {
            starter,
            source,
            settings,
        }
    }

    pub fn from_api(api: Arc<JobApi>, settings: PollSettings) -> Self {
        Self::new(api.clone(), api, settings)
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Validates, submits and starts polling.
    ///
    /// Validation failures are reported before any request is sent; a failed
    /// submission never creates a poller.
    pub async fn start(
        &self,
        request: &LaunchRequest,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<ActiveJob, LaunchError> {
        let request = request.validated()?;
        let kind = request.kind();
        let receipt = self.starter.submit(&request).await.map_err(|source| {
            tracker_error!("failed to start {kind}: {source}");
            LaunchError::Request { kind, source }
        })?;

        let handle = JobHandle::new(receipt.job_id.clone(), kind);
        tracker_info!(
            "{handle}: launched, estimated items {:?}, message {:?}",
            receipt.estimated_items,
            receipt.message
        );

        let poller = JobPoller::new(sink);
        poller.start(handle.clone(), self.source.clone(), self.settings)?;
        Ok(ActiveJob {
            handle,
            receipt,
            poller,
        })
    }
}
