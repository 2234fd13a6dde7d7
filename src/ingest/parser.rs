//! Streaming JSONL parser for session logs.
//!
//! Each line is a self-contained JSON record: `type`, `sessionId`,
//! `timestamp` (RFC3339), and a `message` whose content is either a plain
//! string or an array of blocks (`text`, `tool_use`, `tool_result`). A
//! `toolUseResult` side channel may carry `subagent_type` and
//! `totalDurationMs`. Unknown fields are ignored; malformed lines are
//! skipped and counted, never fatal.

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::data::{EntryKind, LogEntry, ToolResult, ToolUse};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RawRecord {
    session_id: Option<String>,
    #[serde(rename = "type")]
    record_type: Option<String>,
    timestamp: Option<String>,
    message: Option<RawMessage>,
    summary: Option<String>,
    tool_use_result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawMessage {
    content: Option<RawContent>,
    usage: Option<RawUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Text(String),
    Blocks(Vec<RawBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    #[serde(rename = "tool_result")]
    ToolResult {
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        content: serde_json::Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawUsage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

/// Lazy line-by-line reader: entries come out as `Ok`, malformed lines as
/// `Err` with the offending line number. Both are drained from the same
/// iterator, so neither side can be starved.
pub struct JsonlReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_number: usize,
    fallback_session: String,
}

impl<R: BufRead> JsonlReader<R> {
    pub fn new(reader: R, fallback_session: &str) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            fallback_session: fallback_session.to_string(),
        }
    }
}

impl<R: BufRead> Iterator for JsonlReader<R> {
    type Item = Result<LogEntry, String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => {
                    self.line_number += 1;
                    return Some(Err(format!("line {}: read error: {}", self.line_number, e)));
                }
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }

            return Some(
                parse_line(&line, &self.fallback_session)
                    .map_err(|e| format!("line {}: {}", self.line_number, e)),
            );
        }
    }
}

/// Parse result for one file: entries plus the malformed-line record.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub entries: Vec<LogEntry>,
    pub warnings: Vec<String>,
}

impl ParseOutcome {
    pub fn error_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Open and fully drain one log file. I/O failure on open is reported as a
/// single warning with zero entries, matching the skip-and-continue policy.
pub fn parse_file(path: &Path) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            outcome
                .warnings
                .push(format!("failed to open {}: {}", path.display(), e));
            return outcome;
        }
    };

    let fallback_session = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    for item in JsonlReader::new(BufReader::new(file), &fallback_session) {
        match item {
            Ok(entry) => outcome.entries.push(entry),
            Err(warning) => outcome.warnings.push(warning),
        }
    }

    outcome
}

fn parse_line(line: &str, fallback_session: &str) -> Result<LogEntry, String> {
    let record: RawRecord =
        serde_json::from_str(line).map_err(|e| format!("JSON parse error: {}", e))?;

    let kind = EntryKind::parse(record.record_type.as_deref().unwrap_or(""));

    let timestamp = record
        .timestamp
        .as_deref()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&chrono::Utc));

    let session_id = record
        .session_id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback_session.to_string());

    let mut text = String::new();
    let mut tool_uses = Vec::new();
    let mut block_error = false;
    let mut block_result_content: Option<serde_json::Value> = None;

    if let Some(message) = &record.message {
        match &message.content {
            Some(RawContent::Text(s)) => text.push_str(s),
            Some(RawContent::Blocks(blocks)) => {
                for block in blocks {
                    match block {
                        RawBlock::Text { text: t } => text.push_str(t),
                        RawBlock::ToolUse { name, input } => tool_uses.push(ToolUse {
                            name: name.clone(),
                            input: input.clone(),
                        }),
                        RawBlock::ToolResult { is_error, content } => {
                            block_error |= is_error;
                            block_result_content = Some(content.clone());
                        }
                        RawBlock::Unknown => {}
                    }
                }
            }
            None => {}
        }
    }

    // Summary records carry their text at the top level.
    if text.is_empty() {
        if let Some(summary) = &record.summary {
            text.push_str(summary);
        }
    }

    let tokens = record
        .message
        .as_ref()
        .and_then(|m| m.usage.as_ref())
        .map(|u| u.input_tokens.unwrap_or(0) + u.output_tokens.unwrap_or(0))
        .unwrap_or(0);

    let tool_result = build_tool_result(
        record.tool_use_result.as_ref(),
        block_result_content.as_ref(),
        block_error,
    );

    Ok(LogEntry {
        session_id,
        timestamp,
        kind,
        text,
        tool_uses,
        tool_result,
        tokens,
    })
}

fn build_tool_result(
    side_channel: Option<&serde_json::Value>,
    block_content: Option<&serde_json::Value>,
    is_error: bool,
) -> Option<ToolResult> {
    if side_channel.is_none() && block_content.is_none() {
        return None;
    }

    let lookup = |key: &str| -> Option<serde_json::Value> {
        side_channel
            .and_then(|v| v.get(key).cloned())
            .or_else(|| block_content.and_then(|v| v.get(key).cloned()))
    };

    Some(ToolResult {
        tool_name: lookup("tool_name")
            .or_else(|| lookup("toolName"))
            .and_then(|v| v.as_str().map(String::from)),
        is_error,
        subagent_type: lookup("subagent_type")
            .and_then(|v| v.as_str().map(String::from)),
        duration_ms: lookup("totalDurationMs").and_then(|v| v.as_i64()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_all(input: &str) -> (Vec<LogEntry>, Vec<String>) {
        let mut entries = Vec::new();
        let mut warnings = Vec::new();
        for item in JsonlReader::new(Cursor::new(input.to_string()), "fallback") {
            match item {
                Ok(e) => entries.push(e),
                Err(w) => warnings.push(w),
            }
        }
        (entries, warnings)
    }

    #[test]
    fn test_parses_user_entry_with_string_content() {
        let line = r#"{"type":"user","sessionId":"s1","timestamp":"2025-03-10T12:00:00Z","message":{"role":"user","content":"hello there"}}"#;
        let (entries, warnings) = read_all(line);
        assert!(warnings.is_empty());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::User);
        assert_eq!(entries[0].session_id, "s1");
        assert_eq!(entries[0].text, "hello there");
        assert!(entries[0].timestamp.is_some());
    }

    #[test]
    fn test_parses_assistant_tool_use_blocks() {
        let line = r#"{"type":"assistant","sessionId":"s1","timestamp":"2025-03-10T12:00:01Z","message":{"role":"assistant","content":[{"type":"text","text":"on it"},{"type":"tool_use","name":"Task","input":{"subagent_type":"code-reviewer"}}],"usage":{"input_tokens":10,"output_tokens":5}}}"#;
        let (entries, _) = read_all(line);
        assert_eq!(entries[0].tool_uses.len(), 1);
        assert_eq!(entries[0].tool_uses[0].name, "Task");
        assert_eq!(entries[0].tokens, 15);
    }

    #[test]
    fn test_tool_result_side_channel() {
        let line = r#"{"type":"user","sessionId":"s1","timestamp":"2025-03-10T12:00:02Z","message":{"role":"user","content":[{"type":"tool_result","is_error":true,"content":{}}]},"toolUseResult":{"subagent_type":"debugger","totalDurationMs":4200}}"#;
        let (entries, _) = read_all(line);
        let result = entries[0].tool_result.as_ref().unwrap();
        assert!(result.is_error);
        assert_eq!(result.subagent_type.as_deref(), Some("debugger"));
        assert_eq!(result.duration_ms, Some(4200));
    }

    #[test]
    fn test_malformed_line_is_skipped_and_counted() {
        let input = "not json at all\n{\"type\":\"user\",\"sessionId\":\"s1\",\"message\":{\"content\":\"ok\"}}\n";
        let (entries, warnings) = read_all(input);
        assert_eq!(entries.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("line 1"));
    }

    #[test]
    fn test_missing_session_falls_back_to_file_stem() {
        let line = r#"{"type":"user","message":{"content":"x"}}"#;
        let (entries, _) = read_all(line);
        assert_eq!(entries[0].session_id, "fallback");
    }

    #[test]
    fn test_missing_timestamp_survives_parsing() {
        let line = r#"{"type":"assistant","sessionId":"s2","message":{"content":"y"}}"#;
        let (entries, _) = read_all(line);
        assert!(entries[0].timestamp.is_none());
    }

    #[test]
    fn test_unknown_type_maps_to_unknown() {
        let line = r#"{"type":"file-history-snapshot","sessionId":"s1"}"#;
        let (entries, _) = read_all(line);
        assert_eq!(entries[0].kind, EntryKind::Unknown);
    }

    #[test]
    fn test_empty_lines_skipped_silently() {
        let input = "\n\n{\"type\":\"summary\",\"sessionId\":\"s1\",\"summary\":\"did things\"}\n";
        let (entries, warnings) = read_all(input);
        assert_eq!(entries.len(), 1);
        assert!(warnings.is_empty());
        assert_eq!(entries[0].text, "did things");
    }
}
