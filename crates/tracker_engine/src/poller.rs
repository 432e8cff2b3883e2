use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracker_core::{
    JobHandle, JobSnapshot, PollSettings, PollerError, PollerPhase, PollerState, TickOutcome,
    MIN_POLL_INTERVAL,
};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::{SnapshotSink, StatusSource, TrackerEvent};

/// Polls one job's status on a fixed cadence until it finishes or is cancelled.
///
/// Clones share the same poller. The tick task holds only a weak reference,
/// so dropping the last clone stops polling as well.
#[derive(Clone)]
pub struct JobPoller {
    inner: Arc<Inner>,
}

struct Inner {
    shared: Mutex<Shared>,
    sink: Arc<dyn SnapshotSink>,
}

struct Shared {
    state: PollerState,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl Shared {
    fn stop_timer(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shared
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .stop_timer();
    }
}

impl JobPoller {
    pub fn new(sink: Arc<dyn SnapshotSink>) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    state: PollerState::new(),
                    cancel: None,
                    task: None,
                }),
                sink,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> PollerPhase {
        self.lock().state.phase()
    }

    pub fn handle(&self) -> Option<JobHandle> {
        self.lock().state.handle().cloned()
    }

    pub fn last_snapshot(&self) -> Option<Arc<JobSnapshot>> {
        self.lock().state.last_snapshot().cloned()
    }

    /// Starts polling `handle`. Must be called inside a tokio runtime.
    ///
    /// The first fetch happens one interval after this call, and the next
    /// tick is only scheduled once the previous fetch has settled.
    pub fn start(
        &self,
        handle: JobHandle,
        source: Arc<dyn StatusSource>,
        settings: PollSettings,
    ) -> Result<(), PollerError> {
        let mut shared = self.lock();
        let generation = shared.state.start(handle.clone())?;
        let token = CancellationToken::new();
        if settings.interval < MIN_POLL_INTERVAL {
            tracker_warn!(
                "{handle}: poll interval {:?} raised to {MIN_POLL_INTERVAL:?}",
                settings.interval
            );
        }
        tracker_debug!(
            "{handle}: polling every {:?} (generation {generation})",
            settings.effective_interval()
        );
        let task = tokio::spawn(run_ticks(
            Arc::downgrade(&self.inner),
            generation,
            token.clone(),
            handle,
            source,
            settings,
        ));
        shared.cancel = Some(token);
        shared.task = Some(task);
        Ok(())
    }

    /// Stops a polling job. A no-op when idle, finished or already cancelled.
    ///
    /// No fetch result is applied after this returns.
    pub fn cancel(&self) {
        let mut shared = self.lock();
        let handle = shared.state.handle().cloned();
        if !shared.state.cancel() {
            return;
        }
        shared.stop_timer();
        if let Some(handle) = handle {
            tracker_debug!("{handle}: polling cancelled");
            self.inner.sink.emit(TrackerEvent::Stopped {
                handle,
                phase: PollerPhase::Cancelled,
            });
        }
    }

    /// Returns to `Idle` from any phase, forgetting the current job.
    pub fn reset(&self) {
        let mut shared = self.lock();
        shared.stop_timer();
        if let Some(handle) = shared.state.handle() {
            tracker_debug!("{handle}: poller reset from {}", shared.state.phase());
        }
        shared.state.reset();
    }
}

async fn run_ticks(
    inner: Weak<Inner>,
    generation: u64,
    token: CancellationToken,
    handle: JobHandle,
    source: Arc<dyn StatusSource>,
    settings: PollSettings,
) {
    let mut failures: u32 = 0;
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(tick_delay(&settings)) => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            result = source.fetch_status(&handle) => result,
        };

        let raw = match result {
            Ok(raw) => {
                failures = 0;
                raw
            }
            Err(err) => {
                failures += 1;
                tracker_warn!(
                    "{handle}: status fetch failed ({failures} in a row, generation {generation}): {err}"
                );
                continue;
            }
        };

        let Some(strong) = inner.upgrade() else {
            return;
        };
        if !apply_tick(&strong, generation, &handle, &raw) {
            return;
        }
    }
}

/// Applies one payload under the lock. Returns whether polling goes on.
fn apply_tick(inner: &Inner, generation: u64, handle: &JobHandle, raw: &serde_json::Value) -> bool {
    let mut shared = inner.shared.lock().unwrap_or_else(PoisonError::into_inner);
    match shared.state.apply_status(generation, raw) {
        TickOutcome::Stale => {
            tracker_debug!("{handle}: discarded stale status (generation {generation})");
            false
        }
        TickOutcome::Continue(snapshot) => {
            inner.sink.emit(TrackerEvent::Snapshot(snapshot));
            true
        }
        TickOutcome::Finished(snapshot) => {
            let phase = shared.state.phase();
            tracker_info!("{handle}: finished as {phase}");
            inner.sink.emit(TrackerEvent::Snapshot(snapshot));
            inner.sink.emit(TrackerEvent::Stopped {
                handle: handle.clone(),
                phase,
            });
            // The calling task is ending; drop its bookkeeping without aborting it.
            shared.cancel = None;
            shared.task = None;
            false
        }
    }
}

fn tick_delay(settings: &PollSettings) -> Duration {
    let interval = settings.effective_interval();
    let jitter_ms = u64::try_from(settings.jitter.as_millis()).unwrap_or(u64::MAX);
    if jitter_ms == 0 {
        return interval;
    }
    interval + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_without_jitter_is_the_interval() {
        let settings = PollSettings::default();
        assert_eq!(tick_delay(&settings), Duration::from_millis(5_000));
    }

    #[test]
    fn zero_interval_is_raised_to_the_floor() {
        let settings = PollSettings {
            interval: Duration::ZERO,
            jitter: Duration::ZERO,
        };
        assert_eq!(tick_delay(&settings), MIN_POLL_INTERVAL);
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let settings = PollSettings {
            interval: Duration::from_millis(1_000),
            jitter: Duration::from_millis(250),
        };
        for _ in 0..100 {
            let delay = tick_delay(&settings);
            assert!(delay >= Duration::from_millis(1_000));
            assert!(delay <= Duration::from_millis(1_250));
        }
    }
}
