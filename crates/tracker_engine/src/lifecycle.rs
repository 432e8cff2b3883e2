use std::sync::Arc;

use tracker_core::LaunchRequest;

use crate::{ActiveJob, JobLauncher, JobPoller, LaunchError, SnapshotSink};

/// Ties a poller to the lifetime of the view that started it.
///
/// Unmounting, resetting or dropping the manager cancels the bound poller.
/// Every method tolerates repeated calls.
#[derive(Default)]
pub struct PollingLifecycleManager {
    poller: Option<JobPoller>,
}

impl PollingLifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polling only starts on an explicit launch.
    pub fn on_mount(&mut self) {}

    pub fn poller(&self) -> Option<&JobPoller> {
        self.poller.as_ref()
    }

    /// Takes ownership of `poller`, cancelling any previously bound one.
    pub fn bind(&mut self, poller: JobPoller) {
        if let Some(previous) = self.poller.replace(poller) {
            previous.cancel();
        }
    }

    /// Launches a new job and binds it, resetting the previous one.
    ///
    /// A rejected launch leaves the currently bound poller untouched.
    pub async fn launch(
        &mut self,
        launcher: &JobLauncher,
        request: &LaunchRequest,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<ActiveJob, LaunchError> {
        let job = launcher.start(request, sink).await?;
        self.reset();
        self.bind(job.poller.clone());
        Ok(job)
    }

    /// "Start new job": stop polling and forget the previous job.
    pub fn reset(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
            poller.reset();
        }
    }

    pub fn on_unmount(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
    }
}

impl Drop for PollingLifecycleManager {
    fn drop(&mut self) {
        self.on_unmount();
    }
}
