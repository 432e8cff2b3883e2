use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracker_logging::tracker_debug;

use crate::{JobHandle, JobSnapshot, JobStatus, Progress, Stats};

/// Short category names some backends report instead of `{category}_processed`.
const CATEGORY_ALIASES: [&str; 3] = ["sources", "notes", "insights"];
const PROCESSED_SUFFIX: &str = "_processed";

/// Maps a raw status payload onto a canonical snapshot.
///
/// Field resolution is canonical name -> alias -> computed fallback -> default.
/// Never fails: malformed fields degrade to defaults.
pub fn normalize(raw: &Value, handle: &JobHandle) -> JobSnapshot {
    let raw_status = raw.get("status").and_then(Value::as_str);
    let status = match raw_status.and_then(JobStatus::parse) {
        Some(status) => status,
        None => {
            tracker_debug!("{handle}: unrecognized status {raw_status:?}, treating as queued");
            JobStatus::Queued
        }
    };

    let started_at = timestamp_field(raw, &["started_at", "created"]);
    // `updated` only marks completion once the job has finished.
    let completed_at = if status.is_terminal() {
        timestamp_field(raw, &["completed_at", "updated"])
    } else {
        timestamp_field(raw, &["completed_at"])
    };

    let progress_obj = raw.get("progress").and_then(Value::as_object);
    let progress = progress_obj.map(normalize_progress);

    let stats_obj = raw.get("stats").and_then(Value::as_object);
    let elapsed = elapsed_seconds(started_at, completed_at);
    let stats = if stats_obj.is_some() || elapsed.is_some() {
        Some(normalize_stats(stats_obj, progress_obj, elapsed))
    } else {
        None
    };

    let error_message = ["error_message", "error"]
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(ToOwned::to_owned);

    JobSnapshot {
        handle: handle.clone(),
        status,
        progress,
        stats,
        started_at,
        completed_at,
        error_message,
    }
}

fn normalize_progress(progress: &Map<String, Value>) -> Progress {
    let total_items = count_field(progress, &["total_items", "total"]);
    let processed_items = match (
        count_field(progress, &["processed_items", "processed"]),
        total_items,
    ) {
        (Some(processed), Some(total)) if processed > total => Some(total),
        (processed, _) => processed,
    };

    let percentage = number_field(progress, &["percentage"])
        .or_else(|| match (processed_items, total_items) {
            (Some(processed), Some(total)) if total > 0 => {
                Some(processed as f64 / total as f64 * 100.0)
            }
            _ => None,
        })
        .unwrap_or(0.0);

    Progress {
        total_items,
        processed_items,
        percentage: clamp_percentage(percentage),
    }
}

fn normalize_stats(
    stats: Option<&Map<String, Value>>,
    progress: Option<&Map<String, Value>>,
    elapsed: Option<f64>,
) -> Stats {
    let empty = Map::new();
    let stats = stats.unwrap_or(&empty);

    let mut per_category_counts = BTreeMap::new();
    for (key, value) in stats {
        if key.ends_with(PROCESSED_SUFFIX) && key.len() > PROCESSED_SUFFIX.len() {
            if let Some(count) = as_count(value) {
                per_category_counts.insert(key.clone(), count);
            }
        }
    }
    for alias in CATEGORY_ALIASES {
        if let Some(count) = stats.get(alias).and_then(as_count) {
            per_category_counts
                .entry(format!("{alias}{PROCESSED_SUFFIX}"))
                .or_insert(count);
        }
    }

    let failed_items = count_field(stats, &["failed_items", "failed"])
        .or_else(|| progress.and_then(|p| count_field(p, &["failed_items"])))
        .unwrap_or(0);

    let processing_time_seconds = number_field(stats, &["processing_time", "processing_time_seconds"])
        .filter(|secs| *secs >= 0.0)
        .or(elapsed);

    Stats {
        per_category_counts,
        failed_items,
        processing_time_seconds,
    }
}

/// Parses the timestamp shapes the backend is known to emit.
///
/// Naive values are taken as UTC. Returns `None` rather than failing.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn elapsed_seconds(
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
) -> Option<f64> {
    let (start, end) = (started_at?, completed_at?);
    let millis = (end - start).num_milliseconds();
    (millis >= 0).then(|| millis as f64 / 1000.0)
}

/// First key whose value parses as a timestamp.
fn timestamp_field(value: &Value, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().and_then(parse_timestamp))
}

fn count_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().filter_map(|key| obj.get(*key)).find_map(as_count)
}

fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|key| obj.get(*key)).find_map(as_number)
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Counts are non-negative integers; negative values clamp to zero.
fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    as_number(value).map(|n| n.max(0.0).round() as u64)
}

fn clamp_percentage(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
