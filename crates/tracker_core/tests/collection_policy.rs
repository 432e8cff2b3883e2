use std::time::Duration;

use pretty_assertions::assert_eq;
use tracker_core::{
    group_episodes_by_status, CollectionRefreshPolicy, EpisodeStatusCounts, EpisodeSummary,
    JobStatus,
};

fn ids(items: &[&EpisodeSummary]) -> Vec<String> {
    items.iter().map(|e| e.id.clone()).collect()
}

fn episode(id: &str, status: Option<&str>) -> EpisodeSummary {
    EpisodeSummary {
        id: id.to_string(),
        name: format!("Episode {id}"),
        job_status: status.map(ToOwned::to_owned),
        ..EpisodeSummary::default()
    }
}

#[test]
fn empty_collection_does_not_refresh() {
    let policy = CollectionRefreshPolicy::default();
    let empty: [&str; 0] = [];
    assert_eq!(policy.next_interval(&empty), None);
}

#[test]
fn any_active_item_refreshes_every_fifteen_seconds() {
    let policy = CollectionRefreshPolicy::default();
    assert_eq!(
        policy.next_interval(&["running"]),
        Some(Duration::from_millis(15_000))
    );
    assert_eq!(
        policy.next_interval(&["completed", "submitted"]),
        Some(Duration::from_millis(15_000))
    );
    assert_eq!(
        policy.next_interval(&[JobStatus::Completed, JobStatus::Queued]),
        Some(Duration::from_millis(15_000))
    );
}

#[test]
fn all_terminal_items_stop_refreshing() {
    let policy = CollectionRefreshPolicy::default();
    assert_eq!(policy.next_interval(&["completed", "failed"]), None);
    assert_eq!(policy.next_interval(&["error", "completed"]), None);
}

#[test]
fn unknown_or_missing_status_is_not_active() {
    let policy = CollectionRefreshPolicy::default();
    let episodes = vec![episode("1", None), episode("2", Some("unknown"))];
    assert_eq!(policy.next_interval(&episodes), None);
}

#[test]
fn disabled_auto_refresh_never_refreshes() {
    let policy = CollectionRefreshPolicy {
        auto_refresh: false,
        ..CollectionRefreshPolicy::default()
    };
    assert_eq!(policy.next_interval(&["running"]), None);
}

#[test]
fn episodes_are_grouped_in_order() {
    let episodes = vec![
        episode("a", Some("processing")),
        episode("b", Some("completed")),
        episode("c", Some("error")),
        episode("d", Some("submitted")),
        episode("e", Some("running")),
        episode("f", None),
    ];
    let groups = group_episodes_by_status(&episodes);

    assert_eq!(ids(&groups.running), vec!["a", "e"]);
    assert_eq!(ids(&groups.completed), vec!["b"]);
    assert_eq!(ids(&groups.failed), vec!["c"]);
    assert_eq!(ids(&groups.pending), vec!["d", "f"]);
    assert_eq!(
        groups.counts(),
        EpisodeStatusCounts {
            total: 6,
            running: 2,
            completed: 1,
            failed: 1,
            pending: 2,
        }
    );
}

#[test]
fn episode_list_deserializes_with_missing_fields() {
    let episodes: Vec<EpisodeSummary> = serde_json::from_str(
        r#"[{"id": "episode:1", "name": "Intro", "job_status": "running", "briefing": "x"},
            {"id": "episode:2", "job_status": null}]"#,
    )
    .unwrap();

    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[1].job_status, None);
    assert!(CollectionRefreshPolicy::default()
        .next_interval(&episodes)
        .is_some());
}
