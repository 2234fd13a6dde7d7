//! View-model projection: bounded, ordered structures the renderer paints
//! directly. Presentation caps (top-10 lists, the 6x6 matrix) live here,
//! not in the analyzers. Every projection tolerates empty input and yields
//! a well-formed empty view-model.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::app::TimelineView;
use crate::analytics::timeline::bucketize;
use crate::data::{
    AgentRelationship, DelegationPattern, DelegationSort, GlobalAgentStats, InteractionPattern,
    MessageEvent, RelationshipStrength, SortColumn, SortDirection, TimelineGraphData,
};
use crate::util::format_time_since;

pub const MATRIX_SIZE: usize = 6;
pub const RELATIONSHIP_CAP: usize = 10;
pub const DELEGATION_CAP: usize = 10;
pub const TOP_PAIR_CAP: usize = 5;

// ---------------------------------------------------------------------------
// Stats leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    /// 1-based dense rank in the current ordering.
    pub rank: usize,
    pub name: String,
    pub count: u64,
    /// Percentage in [0, 100].
    pub success_rate: f64,
    pub mean_duration_ms: f64,
    pub duration_known: bool,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct StatsViewModel {
    pub rows: Vec<StatsRow>,
    pub total_calls: u64,
}

pub fn project_stats(
    stats: &BTreeMap<String, GlobalAgentStats>,
    sort_column: SortColumn,
    sort_direction: SortDirection,
    selected: usize,
) -> StatsViewModel {
    let mut rows: Vec<StatsRow> = stats
        .iter()
        .map(|(name, s)| StatsRow {
            rank: 0,
            name: name.clone(),
            count: s.count,
            success_rate: s.success_rate(),
            mean_duration_ms: s.mean_ms(),
            duration_known: s.duration_known,
            is_selected: false,
        })
        .collect();

    rows.sort_by(|a, b| {
        let ordering = match sort_column {
            SortColumn::Count => b.count.cmp(&a.count),
            SortColumn::SuccessRate => b
                .success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal),
            SortColumn::Duration => b
                .mean_duration_ms
                .partial_cmp(&a.mean_duration_ms)
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        let ordering = match sort_direction {
            SortDirection::Descending => ordering,
            SortDirection::Ascending => ordering.reverse(),
        };
        ordering.then_with(|| a.name.cmp(&b.name))
    });

    let mut total_calls = 0;
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
        row.is_selected = i == selected;
        total_calls += row.count;
    }

    StatsViewModel { rows, total_calls }
}

// ---------------------------------------------------------------------------
// Delegation flows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DelegationRow {
    pub source: String,
    pub target: String,
    pub count: u64,
    pub last_seen: DateTime<Utc>,
    pub time_since: String,
    pub is_selected: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DelegationViewModel {
    pub rows: Vec<DelegationRow>,
    /// Pattern count before filtering, for the "showing x/y" summary.
    pub total: usize,
}

pub fn project_delegation(
    patterns: &[DelegationPattern],
    sort: DelegationSort,
    min_count: u64,
    selected: usize,
    now: DateTime<Utc>,
) -> DelegationViewModel {
    let mut filtered: Vec<&DelegationPattern> =
        patterns.iter().filter(|p| p.count >= min_count).collect();

    match sort {
        DelegationSort::Frequency => filtered.sort_by(|a, b| b.count.cmp(&a.count)),
        DelegationSort::Recency => filtered.sort_by(|a, b| b.last_seen.cmp(&a.last_seen)),
        DelegationSort::Source => filtered.sort_by(|a, b| a.source_agent.cmp(&b.source_agent)),
        DelegationSort::Target => filtered.sort_by(|a, b| a.target_agent.cmp(&b.target_agent)),
    }

    let rows = filtered
        .iter()
        .take(DELEGATION_CAP)
        .enumerate()
        .map(|(i, p)| DelegationRow {
            source: p.source_agent.clone(),
            target: p.target_agent.clone(),
            count: p.count,
            last_seen: p.last_seen,
            time_since: format_time_since(p.last_seen, now),
            is_selected: i == selected,
        })
        .collect();

    DelegationViewModel {
        rows,
        total: patterns.len(),
    }
}

// ---------------------------------------------------------------------------
// Co-occurrence matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixCell {
    SelfCell,
    Scored(RelationshipStrength),
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct MatrixViewModel {
    /// Top agents by aggregate relationship frequency, at most six.
    pub agents: Vec<String>,
    /// `grid[row][col]`, square over `agents`.
    pub grid: Vec<Vec<MatrixCell>>,
    /// Relationship under the cursor when it lands on a scored pair.
    pub selected: Option<AgentRelationship>,
}

pub fn project_matrix(
    relationships: &[AgentRelationship],
    cursor: (usize, usize),
) -> MatrixViewModel {
    if relationships.is_empty() {
        return MatrixViewModel::default();
    }

    // Rank agents by total frequency across their relationships.
    let mut weights: BTreeMap<&str, u64> = BTreeMap::new();
    for rel in relationships {
        *weights.entry(rel.agent1.as_str()).or_default() += rel.frequency;
        *weights.entry(rel.agent2.as_str()).or_default() += rel.frequency;
    }
    let mut ranked: Vec<(&str, u64)> = weights.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let agents: Vec<String> = ranked
        .into_iter()
        .take(MATRIX_SIZE)
        .map(|(name, _)| name.to_string())
        .collect();

    let lookup = |a: &str, b: &str| -> Option<&AgentRelationship> {
        relationships
            .iter()
            .find(|r| (r.agent1 == a && r.agent2 == b) || (r.agent1 == b && r.agent2 == a))
    };

    let grid: Vec<Vec<MatrixCell>> = agents
        .iter()
        .enumerate()
        .map(|(i, row_agent)| {
            agents
                .iter()
                .enumerate()
                .map(|(j, col_agent)| {
                    if i == j {
                        MatrixCell::SelfCell
                    } else {
                        match lookup(row_agent, col_agent) {
                            Some(rel) => MatrixCell::Scored(rel.strength),
                            None => MatrixCell::Empty,
                        }
                    }
                })
                .collect()
        })
        .collect();

    let selected = match (agents.get(cursor.0), agents.get(cursor.1)) {
        (Some(a), Some(b)) if cursor.0 != cursor.1 => lookup(a, b).cloned(),
        _ => None,
    };

    MatrixViewModel { agents, grid, selected }
}

// ---------------------------------------------------------------------------
// Relationship list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RelationshipRow {
    pub relationship: AgentRelationship,
    pub is_selected: bool,
}

pub fn project_relationship_list(
    relationships: &[AgentRelationship],
    selected: usize,
) -> Vec<RelationshipRow> {
    relationships
        .iter()
        .take(RELATIONSHIP_CAP)
        .enumerate()
        .map(|(i, rel)| RelationshipRow {
            relationship: rel.clone(),
            is_selected: i == selected,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InsightsViewModel {
    pub total: usize,
    pub pattern_counts: Vec<(InteractionPattern, usize)>,
    pub strength_counts: Vec<(RelationshipStrength, usize)>,
    pub mean_correlation: f64,
    /// Relationships with correlation >= 0.8.
    pub high_correlation_count: usize,
    pub top_pairs: Vec<AgentRelationship>,
}

pub fn project_insights(relationships: &[AgentRelationship]) -> InsightsViewModel {
    if relationships.is_empty() {
        return InsightsViewModel::default();
    }

    let pattern_counts = InteractionPattern::all()
        .map(|p| (p, relationships.iter().filter(|r| r.pattern == p).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    let strength_counts = RelationshipStrength::all()
        .map(|s| (s, relationships.iter().filter(|r| r.strength == s).count()))
        .filter(|(_, n)| *n > 0)
        .collect();

    let mean_correlation =
        relationships.iter().map(|r| r.correlation).sum::<f64>() / relationships.len() as f64;

    InsightsViewModel {
        total: relationships.len(),
        pattern_counts,
        strength_counts,
        mean_correlation,
        high_correlation_count: relationships.iter().filter(|r| r.correlation >= 0.8).count(),
        // Input is already sorted by correlation.
        top_pairs: relationships.iter().take(TOP_PAIR_CAP).cloned().collect(),
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TimelineViewModel {
    pub graph: Option<TimelineGraphData>,
    /// Mean raw count of the last three buckets, per role.
    pub user_rate: f64,
    pub assistant_rate: f64,
    pub visible_events: usize,
    pub selected_event: Option<MessageEvent>,
}

pub fn project_timeline(events: &[MessageEvent], view: &TimelineView) -> TimelineViewModel {
    if events.is_empty() {
        return TimelineViewModel::default();
    }

    // Viewport anchored at the newest event, shifted by the scroll offset.
    let Some(anchor) = events.iter().map(|e| e.timestamp).max() else {
        return TimelineViewModel::default();
    };
    let view_end = anchor + view.zoom.scroll_step() * view.offset as i32;
    let view_start = view_end - view.zoom.span();

    let visible: Vec<MessageEvent> = events
        .iter()
        .filter(|e| e.timestamp >= view_start && e.timestamp <= view_end)
        .cloned()
        .collect();

    let selected_event = view
        .selected_event
        .as_ref()
        .and_then(|id| events.iter().find(|e| &e.id == id))
        .cloned();

    let graph = bucketize(&visible, view.zoom.graph_width());

    let (user_rate, assistant_rate) = match &graph {
        Some(data) => (
            trailing_rate(&data.user_activity, data.max_value),
            trailing_rate(&data.assistant_activity, data.max_value),
        ),
        None => (0.0, 0.0),
    };

    TimelineViewModel {
        graph,
        user_rate,
        assistant_rate,
        visible_events: visible.len(),
        selected_event,
    }
}

fn trailing_rate(activity: &[f64], max_value: u64) -> f64 {
    let take = activity.len().min(3);
    if take == 0 {
        return 0.0;
    }
    let sum: f64 = activity[activity.len() - take..]
        .iter()
        .map(|v| v * max_value as f64)
        .sum();
    sum / take as f64
}
