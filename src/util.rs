//! Shared formatting helpers.

use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

/// Human-readable age of a timestamp: "5m ago", "3h ago", "12d ago".
pub fn format_time_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(from);
    let minutes = elapsed.num_minutes().max(0);
    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 24 * 60 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (24 * 60))
    }
}

/// Truncate to at most `max_chars` characters, ellipsis included in the
/// budget. Char-based so multi-byte content never splits.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Pad or truncate to an exact display width for column alignment.
pub fn fit_width(s: &str, width: usize) -> String {
    let truncated = truncate_chars(s, width);
    let pad = width.saturating_sub(UnicodeWidthStr::width(truncated.as_str()));
    format!("{}{}", truncated, " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_time_since() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let five_min = Utc.with_ymd_and_hms(2025, 6, 1, 11, 55, 0).unwrap();
        let three_hours = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        let two_days = Utc.with_ymd_and_hms(2025, 5, 30, 12, 0, 0).unwrap();

        assert_eq!(format_time_since(five_min, now), "5m ago");
        assert_eq!(format_time_since(three_hours, now), "3h ago");
        assert_eq!(format_time_since(two_days, now), "2d ago");
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_includes_ellipsis_in_budget() {
        let out = truncate_chars("abcdefgh", 5);
        assert_eq!(out, "abcd…");
        assert_eq!(out.chars().count(), 5);
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let out = truncate_chars("日本語のテキストです", 4);
        assert_eq!(out.chars().count(), 4);
        assert!(out.ends_with('…'));
    }
}
