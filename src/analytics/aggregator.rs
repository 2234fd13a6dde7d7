//! Per-agent statistics accumulation.

use std::collections::BTreeMap;

use crate::data::{AgentInvocation, GlobalAgentStats};

/// Accumulates invocations into `agent -> GlobalAgentStats`. No sorting
/// happens here; ordering is a projection concern.
#[derive(Debug, Default)]
pub struct AgentStatsAggregator {
    stats: BTreeMap<String, GlobalAgentStats>,
}

impl AgentStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, invocation: &AgentInvocation) {
        let entry = self.stats.entry(invocation.agent_name.clone()).or_default();

        entry.count += 1;
        if invocation.success {
            entry.success_count += 1;
        } else {
            entry.failure_count += 1;
        }

        // A zero duration means the log carried none; it must not drag the
        // mean down or fake a minimum.
        if invocation.duration_ms > 0 {
            entry.duration_known = true;
            entry.total_duration_ms += invocation.duration_ms;
            entry.min_ms = Some(match entry.min_ms {
                Some(min) => min.min(invocation.duration_ms),
                None => invocation.duration_ms,
            });
            entry.max_ms = Some(match entry.max_ms {
                Some(max) => max.max(invocation.duration_ms),
                None => invocation.duration_ms,
            });
        }
    }

    pub fn get_all(&self) -> &BTreeMap<String, GlobalAgentStats> {
        &self.stats
    }

    pub fn into_stats(self) -> BTreeMap<String, GlobalAgentStats> {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DetectionMethod;
    use chrono::Utc;

    fn invocation(agent: &str, success: bool, duration_ms: i64) -> AgentInvocation {
        AgentInvocation {
            agent_name: agent.to_string(),
            session_id: "s1".to_string(),
            timestamp: Utc::now(),
            duration_ms,
            success,
            confidence: 1.0,
            detection_method: DetectionMethod::TaskTool,
        }
    }

    #[test]
    fn test_count_identity() {
        let mut agg = AgentStatsAggregator::new();
        agg.process(&invocation("a", true, 100));
        agg.process(&invocation("a", false, 200));
        agg.process(&invocation("a", true, 50));

        let stats = &agg.get_all()["a"];
        assert_eq!(stats.count, 3);
        assert_eq!(stats.success_count + stats.failure_count, stats.count);
        assert_eq!(stats.success_count, 2);
    }

    #[test]
    fn test_duration_tracking() {
        let mut agg = AgentStatsAggregator::new();
        agg.process(&invocation("a", true, 100));
        agg.process(&invocation("a", true, 300));

        let stats = &agg.get_all()["a"];
        assert!(stats.duration_known);
        assert_eq!(stats.total_duration_ms, 400);
        assert_eq!(stats.min_ms, Some(100));
        assert_eq!(stats.max_ms, Some(300));
        assert!(stats.mean_ms() <= stats.max_ms.unwrap() as f64);
    }

    #[test]
    fn test_zero_duration_marks_unknown() {
        let mut agg = AgentStatsAggregator::new();
        agg.process(&invocation("a", true, 0));

        let stats = &agg.get_all()["a"];
        assert!(!stats.duration_known);
        assert_eq!(stats.min_ms, None);
        assert_eq!(stats.mean_ms(), 0.0);
    }

    #[test]
    fn test_agents_tracked_independently() {
        let mut agg = AgentStatsAggregator::new();
        agg.process(&invocation("a", true, 10));
        agg.process(&invocation("b", false, 20));

        assert_eq!(agg.get_all().len(), 2);
        assert_eq!(agg.get_all()["a"].failure_count, 0);
        assert_eq!(agg.get_all()["b"].failure_count, 1);
    }
}
