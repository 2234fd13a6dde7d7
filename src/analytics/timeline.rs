//! Timeline bucketing: message events to normalized activity series.

use chrono::{DateTime, Duration, Utc};

use crate::data::{MessageEvent, MessageRole, TimelineGraphData};

/// Bucket events into `N = clamp(width, 20, 120)` slices covering the event
/// span, widened so it is never shorter than an hour. Only user and
/// assistant events are graphed; both series share one normalization max.
pub fn bucketize(events: &[MessageEvent], width: usize) -> Option<TimelineGraphData> {
    if events.is_empty() {
        return None;
    }

    let num_buckets = width.clamp(20, 120);

    let mut min_ts = events[0].timestamp;
    let mut max_ts = events[0].timestamp;
    for event in events {
        min_ts = min_ts.min(event.timestamp);
        max_ts = max_ts.max(event.timestamp);
    }
    if max_ts - min_ts < Duration::hours(1) {
        min_ts = max_ts - Duration::hours(1);
    }

    let span = max_ts - min_ts;
    let bucket_duration = span / num_buckets as i32;

    let mut user_buckets = vec![0u64; num_buckets];
    let mut assistant_buckets = vec![0u64; num_buckets];

    for event in events {
        let idx = bucket_index(event.timestamp, min_ts, bucket_duration, num_buckets);
        match event.role {
            MessageRole::User => user_buckets[idx] += 1,
            MessageRole::Assistant => assistant_buckets[idx] += 1,
            MessageRole::Tool | MessageRole::System => {}
        }
    }

    let max_value = user_buckets
        .iter()
        .chain(assistant_buckets.iter())
        .copied()
        .max()
        .unwrap_or(0);

    let normalize = |buckets: &[u64]| -> Vec<f64> {
        if max_value == 0 {
            vec![0.0; buckets.len()]
        } else {
            buckets
                .iter()
                .map(|&count| count as f64 / max_value as f64)
                .collect()
        }
    };

    Some(TimelineGraphData {
        user_activity: normalize(&user_buckets),
        assistant_activity: normalize(&assistant_buckets),
        time_labels: generate_labels(min_ts, max_ts, num_buckets, bucket_duration),
        max_value,
        bucket_duration,
        start_time: min_ts,
        end_time: max_ts,
    })
}

fn bucket_index(
    t: DateTime<Utc>,
    start: DateTime<Utc>,
    bucket_duration: Duration,
    num_buckets: usize,
) -> usize {
    let millis = bucket_duration.num_milliseconds().max(1);
    let offset = (t - start).num_milliseconds();
    let idx = offset.div_euclid(millis);
    idx.clamp(0, num_buckets as i64 - 1) as usize
}

fn generate_labels(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    num_buckets: usize,
    bucket_duration: Duration,
) -> Vec<String> {
    let span = end - start;
    let (format, interval) = if span <= Duration::hours(1) {
        ("%H:%M", num_buckets / 4)
    } else if span <= Duration::hours(24) {
        ("%H:%M", num_buckets / 6)
    } else if span <= Duration::days(7) {
        ("%a %H:%M", num_buckets / 7)
    } else {
        ("%b %-d", num_buckets / 5)
    };
    let interval = interval.max(1);

    (0..num_buckets)
        .map(|i| {
            if i % interval == 0 || i == num_buckets - 1 {
                (start + bucket_duration * i as i32).format(format).to_string()
            } else {
                String::new()
            }
        })
        .collect()
}
