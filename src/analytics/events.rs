//! Extraction of timeline message events from parsed entries.

use crate::analytics::detector::detect_agent;
use crate::data::{EntryKind, LogEntry, MessageEvent, MessageRole};
use crate::util::truncate_chars;

const CONTENT_BUDGET: usize = 200;

/// Classify entries into message events. Entries without a timestamp or a
/// recognizable role are dropped.
pub fn extract_message_events(entries: &[LogEntry]) -> Vec<MessageEvent> {
    entries.iter().filter_map(to_event).collect()
}

fn to_event(entry: &LogEntry) -> Option<MessageEvent> {
    let timestamp = entry.timestamp?;

    let role = match entry.kind {
        EntryKind::User => MessageRole::User,
        EntryKind::Assistant => MessageRole::Assistant,
        EntryKind::Tool => MessageRole::Tool,
        EntryKind::Summary => MessageRole::System,
        // Anything else falls back to content markers or gets dropped.
        EntryKind::System | EntryKind::Unknown => role_from_content(&entry.text)?,
    };

    let agent_used = detect_agent(entry)
        .filter(|d| d.confidence > 0.5)
        .map(|d| d.agent);

    let tools_used: Vec<String> = entry.tool_uses.iter().map(|t| t.name.clone()).collect();

    let success = entry
        .tool_result
        .as_ref()
        .map(|r| !r.is_error)
        .unwrap_or(true);

    let duration_ms = entry
        .tool_result
        .as_ref()
        .and_then(|r| r.duration_ms)
        .unwrap_or(0);

    Some(MessageEvent {
        id: format!(
            "{}-{}",
            entry.session_id,
            timestamp.timestamp_nanos_opt().unwrap_or(0)
        ),
        timestamp,
        session_id: entry.session_id.clone(),
        role,
        content: truncate_chars(&entry.text, CONTENT_BUDGET),
        token_count: entry.tokens,
        agent_used,
        tools_used,
        success,
        duration_ms,
    })
}

fn role_from_content(text: &str) -> Option<MessageRole> {
    if text.contains("Human:") || text.contains("user:") {
        Some(MessageRole::User)
    } else if text.contains("Assistant:") || text.contains("assistant:") {
        Some(MessageRole::Assistant)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ToolResult;
    use chrono::{TimeZone, Utc};

    fn entry(kind: EntryKind, text: &str) -> LogEntry {
        LogEntry {
            session_id: "s1".to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()),
            kind,
            text: text.to_string(),
            tool_uses: Vec::new(),
            tool_result: None,
            tokens: 0,
        }
    }

    #[test]
    fn test_role_mapping() {
        let entries = vec![
            entry(EntryKind::User, "hi"),
            entry(EntryKind::Assistant, "hello"),
            entry(EntryKind::Tool, "ran"),
            entry(EntryKind::Summary, "done"),
        ];
        let events = extract_message_events(&entries);
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].role, MessageRole::User);
        assert_eq!(events[1].role, MessageRole::Assistant);
        assert_eq!(events[2].role, MessageRole::Tool);
        assert_eq!(events[3].role, MessageRole::System);
    }

    #[test]
    fn test_unknown_kind_infers_from_markers() {
        let user_marked = entry(EntryKind::Unknown, "Human: what is this");
        let asst_marked = entry(EntryKind::Unknown, "Assistant: here you go");
        let unmarked = entry(EntryKind::Unknown, "nothing to see");

        let events = extract_message_events(&[user_marked, asst_marked, unmarked]);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].role, MessageRole::User);
        assert_eq!(events[1].role, MessageRole::Assistant);
    }

    #[test]
    fn test_zero_timestamp_dropped() {
        let mut e = entry(EntryKind::User, "hi");
        e.timestamp = None;
        assert!(extract_message_events(&[e]).is_empty());
    }

    #[test]
    fn test_content_truncated_to_budget() {
        let long = "x".repeat(500);
        let e = entry(EntryKind::User, &long);
        let events = extract_message_events(&[e]);
        assert_eq!(events[0].content.chars().count(), 200);
        assert!(events[0].content.ends_with('…'));
    }

    #[test]
    fn test_id_is_session_and_nanos() {
        let e = entry(EntryKind::User, "hi");
        let events = extract_message_events(&[e.clone()]);
        let nanos = e.timestamp.unwrap().timestamp_nanos_opt().unwrap();
        assert_eq!(events[0].id, format!("s1-{}", nanos));
    }

    #[test]
    fn test_errored_tool_result_marks_failure() {
        let mut e = entry(EntryKind::User, "");
        e.tool_result = Some(ToolResult {
            is_error: true,
            duration_ms: Some(150),
            ..Default::default()
        });
        let events = extract_message_events(&[e]);
        assert!(!events[0].success);
        assert_eq!(events[0].duration_ms, 150);
    }
}
