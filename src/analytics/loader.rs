//! The reload pipeline: discover files, parse entries, detect agents, and
//! assemble an immutable analytics snapshot.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analytics::aggregator::AgentStatsAggregator;
use crate::analytics::delegation::DelegationAnalyzer;
use crate::analytics::detector::detect_agent;
use crate::analytics::events::extract_message_events;
use crate::data::{AgentInvocation, AnalyticsSnapshot, DetectionMethod, LogEntry};
use crate::error::{LoadError, LoadResult};
use crate::ingest::{parse_file, LogDiscovery};

/// Parse a `--since`-style filter into a cutoff instant.
///
/// Accepts `today`, `yesterday`, `Nh`, `Nd`, `YYYY-MM-DD`, and
/// `YYYY-MM-DD HH:MM:SS`. Date forms are interpreted in local time.
pub fn parse_time_filter(since: &str, now: DateTime<Utc>) -> LoadResult<DateTime<Utc>> {
    let since = since.trim();

    match since.to_ascii_lowercase().as_str() {
        "today" => return Ok(local_midnight(now)),
        "yesterday" => return Ok(local_midnight(now) - Duration::days(1)),
        _ => {}
    }

    if let Some(hours) = since.strip_suffix('h') {
        if let Ok(h) = hours.parse::<i64>() {
            if h >= 0 {
                return Ok(now - Duration::hours(h));
            }
        }
    }
    if let Some(days) = since.strip_suffix('d') {
        if let Ok(d) = days.parse::<i64>() {
            if d >= 0 {
                return Ok(now - Duration::days(d));
            }
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(since, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            if let Some(dt) = Local.from_local_datetime(&naive).single() {
                return Ok(dt.with_timezone(&Utc));
            }
        }
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(since, "%Y-%m-%d %H:%M:%S") {
        if let Some(dt) = Local.from_local_datetime(&naive).single() {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    Err(LoadError::InvalidTimeFilter(since.to_string()))
}

fn local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(&Local);
    let Some(midnight) = local.date_naive().and_hms_opt(0, 0, 0) else {
        return now;
    };
    Local
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Run the whole pipeline for one filter. Pure with respect to `now`; all
/// I/O is read-only.
pub fn load_snapshot(
    discovery: &LogDiscovery,
    project_root: &Path,
    since: Option<&str>,
    now: DateTime<Utc>,
) -> LoadResult<AnalyticsSnapshot> {
    let start_time = match since.filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_time_filter(s, now)?),
        None => None,
    };

    let files = discovery.find_log_files(project_root, start_time);
    if files.is_empty() {
        return Err(LoadError::NoLogFiles);
    }

    let mut entries: Vec<LogEntry> = Vec::new();
    let mut parse_errors = 0usize;
    for file in &files {
        let outcome = parse_file(file);
        if outcome.error_count() > 0 {
            tracing::debug!(
                "{}: {} malformed lines skipped",
                file.display(),
                outcome.error_count()
            );
        }
        parse_errors += outcome.error_count();
        entries.extend(outcome.entries);
    }

    if let Some(cutoff) = start_time {
        entries.retain(|e| match e.timestamp {
            Some(ts) => ts >= cutoff,
            None => true,
        });
    }

    if entries.is_empty() {
        // Every line failing to parse degrades to the same user-visible
        // outcome as an empty corpus after filtering.
        tracing::debug!("no usable entries ({} parse errors total)", parse_errors);
        return Err(LoadError::NoEntriesMatch);
    }

    Ok(build_snapshot(&entries))
}

/// Assemble analytics from already-parsed entries. Split out so tests can
/// feed synthetic corpora without touching the filesystem.
pub fn build_snapshot(entries: &[LogEntry]) -> AnalyticsSnapshot {
    let mut aggregator = AgentStatsAggregator::new();
    let mut session_agents: BTreeMap<String, Vec<(String, DateTime<Utc>)>> = BTreeMap::new();

    for entry in entries {
        let Some(timestamp) = entry.timestamp else {
            continue;
        };
        let Some(detection) = detect_agent(entry) else {
            continue;
        };
        if detection.confidence <= 0.5 {
            continue;
        }

        // Success and duration come from the log only when the detection
        // carries them (a Task result); otherwise they default rather than
        // being fabricated.
        let (success, duration_ms) = match detection.method {
            DetectionMethod::TaskResult => {
                let result = entry.tool_result.as_ref();
                (
                    result.map(|r| !r.is_error).unwrap_or(true),
                    result.and_then(|r| r.duration_ms).unwrap_or(0),
                )
            }
            DetectionMethod::TaskTool | DetectionMethod::Mention => (true, 0),
        };

        let invocation = AgentInvocation {
            agent_name: detection.agent.clone(),
            session_id: entry.session_id.clone(),
            timestamp,
            duration_ms,
            success,
            confidence: detection.confidence,
            detection_method: detection.method,
        };

        aggregator.process(&invocation);
        session_agents
            .entry(entry.session_id.clone())
            .or_default()
            .push((detection.agent, timestamp));
    }

    let mut delegation = DelegationAnalyzer::new();
    for (session_id, mut agents) in session_agents {
        // File order is not trusted; sessions are ordered by timestamp.
        agents.sort_by_key(|(_, ts)| *ts);
        delegation.record_session(&session_id, &agents);
    }

    let mut message_events = extract_message_events(entries);
    message_events.sort_by_key(|e| e.timestamp);

    AnalyticsSnapshot {
        agent_stats: aggregator.into_stats(),
        delegation_patterns: delegation.transition_patterns(),
        co_occurrences: delegation.co_occurrence_patterns(),
        message_events,
    }
}
