use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::{normalize, JobHandle, JobSnapshot, JobStatus};

/// Cadence observed for rebuild status polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);

/// Shortest delay between two ticks; smaller intervals are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound of a random delay added to each tick. Zero disables it.
    pub jitter: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            jitter: Duration::ZERO,
        }
    }
}

impl PollSettings {
    /// The configured interval, never below [`MIN_POLL_INTERVAL`].
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    Idle,
    Polling,
    Completed,
    Failed,
    Cancelled,
}

impl PollerPhase {
    /// True once no further ticks can happen without a `reset`.
    pub fn is_stopped(self) -> bool {
        matches!(
            self,
            PollerPhase::Completed | PollerPhase::Failed | PollerPhase::Cancelled
        )
    }
}

impl fmt::Display for PollerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollerPhase::Idle => "idle",
            PollerPhase::Polling => "polling",
            PollerPhase::Completed => "completed",
            PollerPhase::Failed => "failed",
            PollerPhase::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollerError {
    #[error("poller is {phase}; reset it before starting another job")]
    AlreadyPolling { phase: PollerPhase },
}

/// Result of feeding one status payload into the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The payload belongs to an older generation or a stopped poller.
    Stale,
    /// Non-terminal snapshot; keep polling.
    Continue(Arc<JobSnapshot>),
    /// Terminal snapshot; the poller has stopped.
    Finished(Arc<JobSnapshot>),
}

/// Pure poller state machine: `Idle -> Polling -> {Completed, Failed, Cancelled}`.
///
/// Every `start`, `cancel` and `reset` bumps the generation so a payload
/// fetched on behalf of an earlier run can be recognized and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerState {
    phase: PollerPhase,
    generation: u64,
    handle: Option<JobHandle>,
    last_snapshot: Option<Arc<JobSnapshot>>,
}

impl Default for PollerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PollerState {
    pub fn new() -> Self {
        Self {
            phase: PollerPhase::Idle,
            generation: 0,
            handle: None,
            last_snapshot: None,
        }
    }

    pub fn phase(&self) -> PollerPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    pub fn last_snapshot(&self) -> Option<&Arc<JobSnapshot>> {
        self.last_snapshot.as_ref()
    }

    /// Whether a fetch tagged with `generation` may still be applied.
    pub fn accepts(&self, generation: u64) -> bool {
        self.phase == PollerPhase::Polling && self.generation == generation
    }

    /// `Idle -> Polling`. Returns the generation that tags this run's fetches.
    pub fn start(&mut self, handle: JobHandle) -> Result<u64, PollerError> {
        if self.phase != PollerPhase::Idle {
            return Err(PollerError::AlreadyPolling { phase: self.phase });
        }
        self.generation += 1;
        self.phase = PollerPhase::Polling;
        self.handle = Some(handle);
        self.last_snapshot = None;
        Ok(self.generation)
    }

    pub fn apply_status(&mut self, generation: u64, raw: &Value) -> TickOutcome {
        if !self.accepts(generation) {
            return TickOutcome::Stale;
        }
        let Some(handle) = self.handle.as_ref() else {
            return TickOutcome::Stale;
        };
        let snapshot = Arc::new(normalize(raw, handle));
        self.last_snapshot = Some(snapshot.clone());
        match snapshot.status {
            JobStatus::Completed => {
                self.phase = PollerPhase::Completed;
                TickOutcome::Finished(snapshot)
            }
            JobStatus::Failed => {
                self.phase = PollerPhase::Failed;
                TickOutcome::Finished(snapshot)
            }
            JobStatus::Queued | JobStatus::Running => TickOutcome::Continue(snapshot),
        }
    }

    /// `Polling -> Cancelled`. Returns false (and changes nothing) otherwise.
    pub fn cancel(&mut self) -> bool {
        if self.phase != PollerPhase::Polling {
            return false;
        }
        self.phase = PollerPhase::Cancelled;
        self.generation += 1;
        true
    }

    /// Back to `Idle` from any phase, dropping the handle and last snapshot.
    pub fn reset(&mut self) {
        self.phase = PollerPhase::Idle;
        self.generation += 1;
        self.handle = None;
        self.last_snapshot = None;
    }
}
