//! Plain-text formatting of tracker output.

use tracker_core::{EpisodeStatusGroups, EpisodeSummary, JobSnapshot, JobStatus};
use tracker_engine::ActiveJob;

pub(crate) fn receipt_line(job: &ActiveJob) -> String {
    let mut line = format!("started {}", job.handle);
    if let Some(message) = &job.receipt.message {
        line.push_str(&format!(": {message}"));
    }
    if let Some(items) = job.receipt.estimated_items {
        line.push_str(&format!(" ({items} items)"));
    }
    line
}

pub(crate) fn snapshot_line(snapshot: &JobSnapshot) -> String {
    let mut line = format!("[{}] {}", snapshot.status, snapshot.handle);
    if let Some(progress) = &snapshot.progress {
        line.push_str(&format!(" {}", progress.display()));
    }
    if let Some(stats) = &snapshot.stats {
        let counts: Vec<String> = stats
            .per_category_counts
            .iter()
            .map(|(name, count)| format!("{}={count}", name.trim_end_matches("_processed")))
            .collect();
        if !counts.is_empty() {
            line.push_str(&format!(" [{}]", counts.join(", ")));
        }
        if stats.failed_items > 0 {
            line.push_str(&format!(" failed={}", stats.failed_items));
        }
        if snapshot.is_terminal() {
            if let Some(secs) = stats.processing_time_seconds {
                line.push_str(&format!(" in {secs:.1}s"));
            }
        }
    }
    if snapshot.status == JobStatus::Failed {
        let message = snapshot.error_message.as_deref().unwrap_or("unknown error");
        line.push_str(&format!(": {message}"));
    }
    line
}

pub(crate) fn episode_table(groups: &EpisodeStatusGroups<'_, EpisodeSummary>) -> String {
    let counts = groups.counts();
    let mut out = format!(
        "{} episodes: {} running, {} pending, {} completed, {} failed\n",
        counts.total, counts.running, counts.pending, counts.completed, counts.failed
    );
    let sections = [
        ("running", &groups.running),
        ("pending", &groups.pending),
        ("completed", &groups.completed),
        ("failed", &groups.failed),
    ];
    for (label, episodes) in sections {
        for episode in episodes.iter() {
            out.push_str(&format!("{label:<10} {:<30} {}\n", episode.name, episode.id));
        }
    }
    out
}
