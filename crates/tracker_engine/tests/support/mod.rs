#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use serde_json::Value;
use tracker_core::{JobHandle, LaunchRequest};
use tracker_engine::{
    ApiError, ApiFailureKind, JobStarter, LaunchReceipt, SnapshotSink, StatusSource,
    TrackerEvent,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

pub fn network_error() -> ApiError {
    ApiError {
        kind: ApiFailureKind::Network,
        message: "connection reset".to_string(),
    }
}

/// Status source that replays a script, then repeats `fallback`.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Value, ApiError>>>,
    fallback: Value,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Value, ApiError>>, fallback: Value) -> Arc<Self> {
        Self::with_delay(script, fallback, Duration::ZERO)
    }

    pub fn with_delay(
        script: Vec<Result<Value, ApiError>>,
        fallback: Value,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch_status(&self, _handle: &JobHandle) -> Result<Value, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub struct StubStarter {
    result: Result<LaunchReceipt, ApiError>,
    submitted: Mutex<Vec<LaunchRequest>>,
}

impl StubStarter {
    pub fn accepting(job_id: &str, estimated_items: Option<u64>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(LaunchReceipt {
                job_id: job_id.to_string(),
                message: Some("started".to_string()),
                estimated_items,
            }),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: ApiError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            submitted: Mutex::new(Vec::new()),
        })
    }

    pub fn submitted(&self) -> Vec<LaunchRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl JobStarter for StubStarter {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchReceipt, ApiError> {
        self.submitted.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<TrackerEvent>>,
}

impl TestSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TrackerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, TrackerEvent::Snapshot(_)))
            .count()
    }
}

impl SnapshotSink for TestSink {
    fn emit(&self, event: TrackerEvent) {
        self.events.lock().unwrap().push(event);
    }
}
