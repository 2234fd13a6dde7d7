//! Delegation analysis: directed transitions and undirected co-occurrences.
//!
//! Fed an ordered sequence of detected agents per session. Transitions are
//! consecutive distinct pairs; co-occurrences are every unordered pair of
//! distinct agents in the session, registered once per session. The two
//! tables are built independently — pair combinations never leak into the
//! transition counts.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::data::{AgentCoOccurrence, DelegationPattern};

#[derive(Debug, Default)]
pub struct DelegationAnalyzer {
    transitions: BTreeMap<(String, String), DelegationPattern>,
    co_occurrences: BTreeMap<(String, String), AgentCoOccurrence>,
}

impl DelegationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one session's ordered agent sequence with per-agent timestamps.
    /// A session with fewer than two distinct agents contributes nothing.
    pub fn record_session(&mut self, session_id: &str, agents: &[(String, DateTime<Utc>)]) {
        for window in agents.windows(2) {
            let (from, from_ts) = &window[0];
            let (to, to_ts) = &window[1];
            if from == to {
                continue;
            }
            let seen = (*from_ts).max(*to_ts);
            self.record_transition(session_id, from, to, seen);
        }

        // Unordered pairs, deduplicated before registration so a pair is
        // counted once per session no matter how often it repeats.
        let mut last_seen_by_pair: BTreeMap<(String, String), DateTime<Utc>> = BTreeMap::new();
        for i in 0..agents.len() {
            for j in (i + 1)..agents.len() {
                let (a, a_ts) = &agents[i];
                let (b, b_ts) = &agents[j];
                if a == b {
                    continue;
                }
                let key = canonical_pair(a, b);
                let seen = (*a_ts).max(*b_ts);
                last_seen_by_pair
                    .entry(key)
                    .and_modify(|t| *t = (*t).max(seen))
                    .or_insert(seen);
            }
        }
        for ((agent1, agent2), seen) in last_seen_by_pair {
            self.record_pair(session_id, &agent1, &agent2, seen);
        }
    }

    fn record_transition(
        &mut self,
        session_id: &str,
        from: &str,
        to: &str,
        seen: DateTime<Utc>,
    ) {
        let key = (from.to_string(), to.to_string());
        match self.transitions.get_mut(&key) {
            Some(pattern) => {
                pattern.count += 1;
                if seen >= pattern.last_seen {
                    pattern.last_seen = seen;
                    pattern.session_id = session_id.to_string();
                }
            }
            None => {
                self.transitions.insert(
                    key,
                    DelegationPattern {
                        source_agent: from.to_string(),
                        target_agent: to.to_string(),
                        count: 1,
                        last_seen: seen,
                        session_id: session_id.to_string(),
                    },
                );
            }
        }
    }

    fn record_pair(&mut self, session_id: &str, agent1: &str, agent2: &str, seen: DateTime<Utc>) {
        let key = (agent1.to_string(), agent2.to_string());
        match self.co_occurrences.get_mut(&key) {
            Some(pair) => {
                if pair.sessions.insert(session_id.to_string()) {
                    pair.count = pair.sessions.len() as u64;
                }
                if seen > pair.last_seen {
                    pair.last_seen = seen;
                }
            }
            None => {
                let mut sessions = std::collections::BTreeSet::new();
                sessions.insert(session_id.to_string());
                self.co_occurrences.insert(
                    key,
                    AgentCoOccurrence {
                        agent1: agent1.to_string(),
                        agent2: agent2.to_string(),
                        count: 1,
                        sessions,
                        last_seen: seen,
                    },
                );
            }
        }
    }

    /// Directed table sorted by count desc, ties by last_seen desc.
    pub fn transition_patterns(&self) -> Vec<DelegationPattern> {
        let mut patterns: Vec<_> = self.transitions.values().cloned().collect();
        patterns.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.last_seen.cmp(&a.last_seen))
        });
        patterns
    }

    /// Undirected table, canonicalized `agent1 < agent2`, sorted like the
    /// transition table.
    pub fn co_occurrence_patterns(&self) -> Vec<AgentCoOccurrence> {
        let mut pairs: Vec<_> = self.co_occurrences.values().cloned().collect();
        pairs.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.last_seen.cmp(&a.last_seen))
        });
        pairs
    }
}

fn canonical_pair(a: &str, b: &str) -> (String, String) {
    if a < b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, minute, 0).unwrap()
    }

    fn sequence(names: &[&str]) -> Vec<(String, DateTime<Utc>)> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), ts(i as u32)))
            .collect()
    }

    #[test]
    fn test_transitions_skip_self_delegation() {
        let mut analyzer = DelegationAnalyzer::new();
        analyzer.record_session("s1", &sequence(&["x", "x", "y"]));

        let patterns = analyzer.transition_patterns();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].source_agent, "x");
        assert_eq!(patterns[0].target_agent, "y");
    }

    #[test]
    fn test_two_session_accumulation() {
        let mut analyzer = DelegationAnalyzer::new();
        analyzer.record_session("s1", &sequence(&["x", "y", "x", "z"]));

        let patterns = analyzer.transition_patterns();
        let find = |src: &str, tgt: &str| {
            patterns
                .iter()
                .find(|p| p.source_agent == src && p.target_agent == tgt)
                .map(|p| p.count)
        };
        assert_eq!(find("x", "y"), Some(1));
        assert_eq!(find("y", "x"), Some(1));
        assert_eq!(find("x", "z"), Some(1));

        let pairs = analyzer.co_occurrence_patterns();
        assert_eq!(pairs.len(), 3);
        for pair in &pairs {
            assert_eq!(pair.count, 1);
            assert!(pair.sessions.contains("s1"));
        }

        analyzer.record_session("s2", &sequence(&["x", "y"]));

        let patterns = analyzer.transition_patterns();
        let find = |src: &str, tgt: &str| {
            patterns
                .iter()
                .find(|p| p.source_agent == src && p.target_agent == tgt)
                .map(|p| p.count)
        };
        assert_eq!(find("x", "y"), Some(2));
        assert_eq!(find("y", "x"), Some(1));
        assert_eq!(find("x", "z"), Some(1));

        let pairs = analyzer.co_occurrence_patterns();
        let xy = pairs
            .iter()
            .find(|p| p.agent1 == "x" && p.agent2 == "y")
            .unwrap();
        assert_eq!(xy.count, 2);
        assert_eq!(xy.sessions.len(), 2);
    }

    #[test]
    fn test_single_agent_session_yields_nothing() {
        let mut analyzer = DelegationAnalyzer::new();
        analyzer.record_session("s1", &sequence(&["x", "x", "x"]));

        assert!(analyzer.transition_patterns().is_empty());
        assert!(analyzer.co_occurrence_patterns().is_empty());
    }

    #[test]
    fn test_canonical_ordering() {
        let mut analyzer = DelegationAnalyzer::new();
        analyzer.record_session("s1", &sequence(&["zeta", "alpha"]));

        let pairs = analyzer.co_occurrence_patterns();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].agent1 < pairs[0].agent2);
        assert_eq!(pairs[0].agent1, "alpha");
    }

    #[test]
    fn test_sessions_are_true_sets() {
        let mut analyzer = DelegationAnalyzer::new();
        analyzer.record_session("s1", &sequence(&["a", "b"]));
        analyzer.record_session("s1", &sequence(&["a", "b"]));

        let pairs = analyzer.co_occurrence_patterns();
        assert_eq!(pairs[0].sessions.len(), 1);
        assert_eq!(pairs[0].count, 1);
        assert!(pairs[0].sessions.len() as u64 <= pairs[0].count);
    }

    #[test]
    fn test_sorted_by_count_then_recency() {
        let mut analyzer = DelegationAnalyzer::new();
        analyzer.record_session("s1", &sequence(&["a", "b", "a", "b"]));
        analyzer.record_session("s2", &sequence(&["c", "d"]));

        let patterns = analyzer.transition_patterns();
        assert!(patterns[0].count >= patterns[patterns.len() - 1].count);
        assert_eq!(patterns[0].source_agent, "a");
    }
}
