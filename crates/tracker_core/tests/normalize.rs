use std::sync::Once;

use pretty_assertions::assert_eq;
use serde_json::json;
use tracker_core::{normalize, parse_timestamp, JobHandle, JobKind, JobStatus};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

fn rebuild_handle() -> JobHandle {
    JobHandle::new("command:abc", JobKind::EmbeddingRebuild)
}

#[test]
fn percentage_is_derived_from_counts_across_ranges() {
    init_logging();
    for total in [1_u64, 3, 7, 50, 200, 1_000] {
        for processed in 0..=total.min(60) {
            let raw = json!({
                "status": "running",
                "progress": {"total_items": total, "processed_items": processed},
            });
            let progress = normalize(&raw, &rebuild_handle()).progress.unwrap();
            let expected = processed as f64 / total as f64 * 100.0;
            assert!((progress.percentage - expected).abs() < 1e-9);
            assert!((0.0..=100.0).contains(&progress.percentage));
        }
    }
}

#[test]
fn legacy_progress_aliases_compute_percentage() {
    init_logging();
    let raw = json!({"status": "running", "progress": {"total": 50, "processed": 10}});
    let progress = normalize(&raw, &rebuild_handle()).progress.unwrap();

    assert_eq!(progress.total_items, Some(50));
    assert_eq!(progress.processed_items, Some(10));
    assert_eq!(progress.percentage, 20.0);
    assert_eq!(progress.display(), "10/50 items (20.0%)");
}

#[test]
fn canonical_names_win_over_aliases() {
    init_logging();
    let raw = json!({
        "status": "running",
        "progress": {"total_items": 80, "total": 10, "processed_items": 20, "processed": 1},
        "stats": {"sources_processed": 12, "sources": 3, "notes": 4, "failed_items": 2, "failed": 9},
    });
    let snapshot = normalize(&raw, &rebuild_handle());
    let progress = snapshot.progress.unwrap();
    let stats = snapshot.stats.unwrap();

    assert_eq!(progress.total_items, Some(80));
    assert_eq!(progress.processed_items, Some(20));
    assert_eq!(progress.percentage, 25.0);
    assert_eq!(stats.processed("sources"), Some(12));
    assert_eq!(stats.processed("notes"), Some(4));
    assert_eq!(stats.processed("insights"), None);
    assert_eq!(stats.failed_items, 2);
}

#[test]
fn reported_percentage_is_kept_but_clamped() {
    init_logging();
    let reported = json!({"status": "running", "progress": {"total": 10, "processed": 1, "percentage": 42.5}});
    assert_eq!(
        normalize(&reported, &rebuild_handle()).progress.unwrap().percentage,
        42.5
    );

    let overflow = json!({"status": "running", "progress": {"percentage": 180.0}});
    assert_eq!(
        normalize(&overflow, &rebuild_handle()).progress.unwrap().percentage,
        100.0
    );
}

#[test]
fn zero_total_and_missing_counts_give_zero_percent() {
    init_logging();
    let zero_total = json!({"status": "queued", "progress": {"total": 0, "processed": 0}});
    assert_eq!(
        normalize(&zero_total, &rebuild_handle()).progress.unwrap().percentage,
        0.0
    );

    let empty = json!({"status": "queued", "progress": {}});
    let progress = normalize(&empty, &rebuild_handle()).progress.unwrap();
    assert_eq!(progress.total_items, None);
    assert_eq!(progress.processed_items, None);
    assert_eq!(progress.percentage, 0.0);
}

#[test]
fn processed_beyond_total_is_clamped() {
    init_logging();
    let raw = json!({"status": "running", "progress": {"total": 5, "processed": 9}});
    let progress = normalize(&raw, &rebuild_handle()).progress.unwrap();

    assert_eq!(progress.processed_items, Some(5));
    assert_eq!(progress.percentage, 100.0);
}

#[test]
fn processing_time_falls_back_to_timestamps() {
    init_logging();
    let raw = json!({
        "status": "completed",
        "started_at": "2024-05-01T10:00:00Z",
        "completed_at": "2024-05-01T10:01:30.500Z",
        "stats": {"sources": 200},
    });
    let stats = normalize(&raw, &rebuild_handle()).stats.unwrap();
    assert_eq!(stats.processing_time_seconds, Some(90.5));

    let reported = json!({
        "status": "completed",
        "started_at": "2024-05-01T10:00:00Z",
        "completed_at": "2024-05-01T10:01:30Z",
        "stats": {"processing_time": 12.0},
    });
    let stats = normalize(&reported, &rebuild_handle()).stats.unwrap();
    assert_eq!(stats.processing_time_seconds, Some(12.0));
}

#[test]
fn failed_status_carries_error_message() {
    init_logging();
    let raw = json!({"status": "failed", "error_message": "embedding model unavailable"});
    let snapshot = normalize(&raw, &rebuild_handle());

    assert_eq!(snapshot.status, JobStatus::Failed);
    assert!(snapshot.is_terminal());
    assert_eq!(
        snapshot.error_message.as_deref(),
        Some("embedding model unavailable")
    );
}

#[test]
fn command_status_shape_maps_created_and_updated() {
    init_logging();
    let handle = JobHandle::new("command:pod", JobKind::PodcastGeneration);
    let running = json!({
        "job_id": "command:pod",
        "status": "processing",
        "created": "2024-05-01 10:00:00.000000+00:00",
        "updated": "2024-05-01 10:00:05.000000+00:00",
    });
    let snapshot = normalize(&running, &handle);
    assert_eq!(snapshot.status, JobStatus::Running);
    assert!(snapshot.started_at.is_some());
    assert_eq!(snapshot.completed_at, None);

    let done = json!({
        "status": "completed",
        "created": "2024-05-01 10:00:00.000000+00:00",
        "updated": "2024-05-01 10:02:00.000000+00:00",
    });
    let snapshot = normalize(&done, &handle);
    assert_eq!(snapshot.handle, handle);
    assert_eq!(snapshot.stats.unwrap().processing_time_seconds, Some(120.0));
}

#[test]
fn unparseable_timestamp_falls_through_to_alias() {
    init_logging();
    let raw = json!({
        "status": "completed",
        "started_at": "not a date",
        "created": "2024-05-01T10:00:00Z",
        "completed_at": "",
        "updated": "2024-05-01T10:00:30Z",
        "error": 17,
    });
    let snapshot = normalize(&raw, &rebuild_handle());
    assert_eq!(
        snapshot.started_at,
        parse_timestamp("2024-05-01T10:00:00Z")
    );
    assert_eq!(
        snapshot.completed_at,
        parse_timestamp("2024-05-01T10:00:30Z")
    );
    assert_eq!(snapshot.stats.unwrap().processing_time_seconds, Some(30.0));
    assert_eq!(snapshot.error_message, None);
}

#[test]
fn unknown_status_keeps_job_active() {
    init_logging();
    let snapshot = normalize(&json!({"status": "unknown"}), &rebuild_handle());
    assert_eq!(snapshot.status, JobStatus::Queued);
    assert!(!snapshot.is_terminal());
}
