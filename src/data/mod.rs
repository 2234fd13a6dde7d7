use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Entry kinds as they appear in the `type` field of session logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Assistant,
    Tool,
    System,
    Summary,
    Unknown,
}

impl EntryKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "tool" | "tool_use" => Self::Tool,
            "system" => Self::System,
            "summary" => Self::Summary,
            _ => Self::Unknown,
        }
    }
}

/// A single tool invocation found inside an assistant entry.
#[derive(Debug, Clone)]
pub struct ToolUse {
    pub name: String,
    pub input: serde_json::Value,
}

/// Tool result metadata attached to a user entry.
#[derive(Debug, Clone, Default)]
pub struct ToolResult {
    pub tool_name: Option<String>,
    pub is_error: bool,
    pub subagent_type: Option<String>,
    pub duration_ms: Option<i64>,
}

/// One parsed line from a session log. Immutable once produced.
///
/// Entries with a missing timestamp survive parsing; consumers that need
/// ordering drop them.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub session_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: EntryKind,
    pub text: String,
    pub tool_uses: Vec<ToolUse>,
    pub tool_result: Option<ToolResult>,
    /// Combined input+output tokens when the record carried usage data.
    pub tokens: u32,
}

/// How an agent was detected in a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    TaskTool,
    TaskResult,
    Mention,
}

impl DetectionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TaskTool => "task-tool",
            Self::TaskResult => "task-result",
            Self::Mention => "mention",
        }
    }
}

/// One detected agent use within a session.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub agent_name: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    /// 0 when the log carried no duration for this invocation.
    pub duration_ms: i64,
    pub success: bool,
    pub confidence: f64,
    pub detection_method: DetectionMethod,
}

/// Accumulated per-agent counters.
///
/// Invariant: `success_count + failure_count == count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalAgentStats {
    pub count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub total_duration_ms: i64,
    pub min_ms: Option<i64>,
    pub max_ms: Option<i64>,
    /// True when at least one invocation carried a real duration.
    pub duration_known: bool,
}

impl GlobalAgentStats {
    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.count as f64
        }
    }

    /// Success rate as a percentage in [0, 100].
    pub fn success_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.count as f64 * 100.0
        }
    }
}

/// Directed transition between two distinct agents, keyed by (source, target).
#[derive(Debug, Clone, PartialEq)]
pub struct DelegationPattern {
    pub source_agent: String,
    pub target_agent: String,
    pub count: u64,
    pub last_seen: DateTime<Utc>,
    /// Most recent session in which this transition was observed.
    pub session_id: String,
}

/// Undirected pair of agents seen in the same session.
///
/// Canonicalized so `agent1 < agent2`; registered once per session, so
/// `count == sessions.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCoOccurrence {
    pub agent1: String,
    pub agent2: String,
    pub count: u64,
    pub sessions: BTreeSet<String>,
    pub last_seen: DateTime<Utc>,
}

/// Role of a message event on the activity timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
    System,
}

impl MessageRole {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::System => "system",
        }
    }
}

/// A timestamped message extracted for the activity timeline.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// Deterministic id: `{session_id}-{timestamp_nanos}`.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub role: MessageRole,
    /// Truncated to 200 chars, ellipsis included in the budget.
    pub content: String,
    pub token_count: u32,
    pub agent_used: Option<String>,
    pub tools_used: Vec<String>,
    pub success: bool,
    pub duration_ms: i64,
}

/// Categorical label for how a pair of agents tends to appear together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionPattern {
    Sequential,
    Concurrent,
    Alternative,
}

impl InteractionPattern {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Concurrent => "concurrent",
            Self::Alternative => "alternative",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Sequential, Self::Concurrent, Self::Alternative].into_iter()
    }
}

/// Ordinal bucket of relationship magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipStrength {
    Strong,
    Medium,
    Weak,
    Minimal,
}

impl RelationshipStrength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Medium => "medium",
            Self::Weak => "weak",
            Self::Minimal => "minimal",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Strong, Self::Medium, Self::Weak, Self::Minimal].into_iter()
    }
}

/// Scored projection over a co-occurrence row.
#[derive(Debug, Clone)]
pub struct AgentRelationship {
    pub agent1: String,
    pub agent2: String,
    pub sessions: Vec<String>,
    pub frequency: u64,
    pub correlation: f64,
    pub pattern: InteractionPattern,
    pub strength: RelationshipStrength,
    pub last_seen: DateTime<Utc>,
}

/// Normalized activity series for the timeline graph.
///
/// All three vectors have the same length; values are bucket counts divided
/// by `max_value` (all zero when `max_value == 0`).
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineGraphData {
    pub user_activity: Vec<f64>,
    pub assistant_activity: Vec<f64>,
    pub time_labels: Vec<String>,
    pub max_value: u64,
    pub bucket_duration: Duration,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Predefined time filter ranges selectable with keys 1-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub label: &'static str,
    /// Filter string handed to the loader; empty means all time.
    pub filter: &'static str,
    pub desc: &'static str,
}

pub const TIME_RANGES: [TimeRange; 6] = [
    TimeRange { label: "1w", filter: "7d", desc: "Last 7 days" },
    TimeRange { label: "1m", filter: "30d", desc: "Last 30 days" },
    TimeRange { label: "3m", filter: "90d", desc: "Last 3 months" },
    TimeRange { label: "6m", filter: "180d", desc: "Last 6 months" },
    TimeRange { label: "1y", filter: "365d", desc: "Last year" },
    TimeRange { label: "all", filter: "", desc: "All time" },
];

/// Dashboard panels in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Timeline,
    CoOccurrence,
    Stats,
    Delegation,
}

impl Panel {
    pub fn next(&self) -> Self {
        match self {
            Self::Timeline => Self::CoOccurrence,
            Self::CoOccurrence => Self::Stats,
            Self::Stats => Self::Delegation,
            Self::Delegation => Self::Timeline,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeline => "Timeline",
            Self::CoOccurrence => "Matrix",
            Self::Stats => "Stats",
            Self::Delegation => "Delegation",
        }
    }
}

/// Sortable columns of the stats leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Count,
    SuccessRate,
    Duration,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::SuccessRate => "Success Rate",
            Self::Duration => "Duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Sort orders for the delegation panel, cycled with `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelegationSort {
    #[default]
    Frequency,
    Recency,
    Source,
    Target,
}

impl DelegationSort {
    pub fn next(&self) -> Self {
        match self {
            Self::Frequency => Self::Recency,
            Self::Recency => Self::Source,
            Self::Source => Self::Target,
            Self::Target => Self::Frequency,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Recency => "recency",
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// Display modes of the co-occurrence panel, cycled with `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixMode {
    #[default]
    Matrix,
    Relationships,
    Insights,
}

impl MatrixMode {
    pub fn next(&self) -> Self {
        match self {
            Self::Matrix => Self::Relationships,
            Self::Relationships => Self::Insights,
            Self::Insights => Self::Matrix,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Matrix => "matrix",
            Self::Relationships => "relationships",
            Self::Insights => "insights",
        }
    }
}

/// Timeline zoom levels with their graph widths and scroll steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomLevel {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl ZoomLevel {
    pub fn graph_width(&self) -> usize {
        match self {
            Self::Hour => 120,
            Self::Day => 80,
            Self::Week => 60,
            Self::Month => 40,
        }
    }

    /// Viewport shift applied by one left/right keypress.
    pub fn scroll_step(&self) -> Duration {
        match self {
            Self::Hour => Duration::minutes(15),
            Self::Day => Duration::hours(2),
            Self::Week => Duration::hours(12),
            Self::Month => Duration::days(3),
        }
    }

    /// Total span shown at this zoom level.
    pub fn span(&self) -> Duration {
        match self {
            Self::Hour => Duration::hours(1),
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    pub fn zoom_in(&self) -> Self {
        match self {
            Self::Hour => Self::Hour,
            Self::Day => Self::Hour,
            Self::Week => Self::Day,
            Self::Month => Self::Week,
        }
    }

    pub fn zoom_out(&self) -> Self {
        match self {
            Self::Hour => Self::Day,
            Self::Day => Self::Week,
            Self::Week => Self::Month,
            Self::Month => Self::Month,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
        }
    }
}

/// Immutable analytic results published by one reload.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsSnapshot {
    pub agent_stats: BTreeMap<String, GlobalAgentStats>,
    pub delegation_patterns: Vec<DelegationPattern>,
    pub co_occurrences: Vec<AgentCoOccurrence>,
    pub message_events: Vec<MessageEvent>,
}

impl AnalyticsSnapshot {
    pub fn is_empty(&self) -> bool {
        self.agent_stats.is_empty() && self.message_events.is_empty()
    }
}
