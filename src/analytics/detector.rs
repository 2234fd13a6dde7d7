//! Agent detection over parsed log entries.
//!
//! Detection is deterministic for a given entry. The reliable signal is a
//! `Task` tool invocation carrying a `subagent_type`; a content-marker
//! fallback catches explicit `@agent-name` mentions at lower confidence.
//! Consumers enforce the > 0.5 threshold, not this module.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::{DetectionMethod, EntryKind, LogEntry};

static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@agent-([A-Za-z0-9][A-Za-z0-9_-]*)").expect("valid mention regex"));

/// A detected agent with its confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub agent: String,
    pub confidence: f64,
    pub method: DetectionMethod,
}

/// Detect an agent in an entry. Returns `None` when no signal is present,
/// which consumers treat as confidence 0.
pub fn detect_agent(entry: &LogEntry) -> Option<Detection> {
    // Task tool invocation with an explicit subagent_type.
    if entry.kind == EntryKind::Assistant {
        for tool_use in &entry.tool_uses {
            if tool_use.name == "Task" {
                if let Some(agent) = subagent_from_input(&tool_use.input) {
                    return Some(Detection {
                        agent,
                        confidence: 1.0,
                        method: DetectionMethod::TaskTool,
                    });
                }
            }
        }
    }

    // Task tool result echoing the subagent_type back.
    if let Some(result) = &entry.tool_result {
        if let Some(agent) = result.subagent_type.as_deref() {
            let agent = agent.trim();
            if !agent.is_empty() {
                return Some(Detection {
                    agent: agent.to_string(),
                    confidence: 1.0,
                    method: DetectionMethod::TaskResult,
                });
            }
        }
    }

    // Explicit mention in message text.
    if let Some(caps) = MENTION_PATTERN.captures(&entry.text) {
        return Some(Detection {
            agent: caps[1].to_string(),
            confidence: 0.6,
            method: DetectionMethod::Mention,
        });
    }

    None
}

fn subagent_from_input(input: &serde_json::Value) -> Option<String> {
    let agent = input.get("subagent_type")?.as_str()?.trim();
    if agent.is_empty() {
        None
    } else {
        Some(agent.to_string())
    }
}
