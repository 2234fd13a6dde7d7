//! Relationship scoring over co-occurrence rows.

use chrono::{DateTime, Duration, Utc};

use crate::data::{
    AgentCoOccurrence, AgentRelationship, InteractionPattern, RelationshipStrength,
};

/// Convert co-occurrence rows into scored relationships, sorted by
/// correlation descending with ties broken by frequency descending. `now`
/// is explicit so recency scoring is reproducible.
pub fn score_relationships(
    co_occurrences: &[AgentCoOccurrence],
    now: DateTime<Utc>,
) -> Vec<AgentRelationship> {
    let mut relationships: Vec<AgentRelationship> = co_occurrences
        .iter()
        .map(|pair| AgentRelationship {
            agent1: pair.agent1.clone(),
            agent2: pair.agent2.clone(),
            sessions: pair.sessions.iter().cloned().collect(),
            frequency: pair.count,
            correlation: correlation(pair.count, pair.last_seen, now),
            pattern: classify_pattern(pair.count),
            strength: classify_strength(pair.count),
            last_seen: pair.last_seen,
        })
        .collect();

    relationships.sort_by(|a, b| {
        b.correlation
            .partial_cmp(&a.correlation)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.frequency.cmp(&a.frequency))
    });

    relationships
}

/// Frequency capped at 10 sessions contributes 80%; activity within the
/// last week contributes the remaining 20%.
fn correlation(count: u64, last_seen: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let frequency_score = (count as f64 / 10.0).min(1.0);
    let recency_bonus = if now.signed_duration_since(last_seen) < Duration::days(7) {
        0.2
    } else {
        0.0
    };
    (frequency_score * 0.8 + recency_bonus).min(1.0)
}

fn classify_strength(count: u64) -> RelationshipStrength {
    match count {
        c if c >= 10 => RelationshipStrength::Strong,
        c if c >= 5 => RelationshipStrength::Medium,
        c if c >= 2 => RelationshipStrength::Weak,
        _ => RelationshipStrength::Minimal,
    }
}

fn classify_pattern(count: u64) -> InteractionPattern {
    match count {
        c if c >= 8 => InteractionPattern::Concurrent,
        c if c >= 3 => InteractionPattern::Sequential,
        _ => InteractionPattern::Alternative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn pair(count: u64, last_seen: DateTime<Utc>) -> AgentCoOccurrence {
        let mut sessions = BTreeSet::new();
        for i in 0..count {
            sessions.insert(format!("s{}", i));
        }
        AgentCoOccurrence {
            agent1: "a".to_string(),
            agent2: "b".to_string(),
            count,
            sessions,
            last_seen,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_high_frequency_is_perfect_correlation() {
        let scored = score_relationships(&[pair(10, now())], now());
        assert_eq!(scored[0].correlation, 1.0);
        assert_eq!(scored[0].strength, RelationshipStrength::Strong);
        assert_eq!(scored[0].pattern, InteractionPattern::Concurrent);
    }

    #[test]
    fn test_stale_pair_loses_recency_bonus() {
        let stale = now() - Duration::days(30);
        let scored = score_relationships(&[pair(10, stale)], now());
        assert!((scored[0].correlation - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_strength_thresholds() {
        assert_eq!(classify_strength(12), RelationshipStrength::Strong);
        assert_eq!(classify_strength(10), RelationshipStrength::Strong);
        assert_eq!(classify_strength(9), RelationshipStrength::Medium);
        assert_eq!(classify_strength(5), RelationshipStrength::Medium);
        assert_eq!(classify_strength(4), RelationshipStrength::Weak);
        assert_eq!(classify_strength(2), RelationshipStrength::Weak);
        assert_eq!(classify_strength(1), RelationshipStrength::Minimal);
    }

    #[test]
    fn test_pattern_thresholds() {
        assert_eq!(classify_pattern(8), InteractionPattern::Concurrent);
        assert_eq!(classify_pattern(7), InteractionPattern::Sequential);
        assert_eq!(classify_pattern(3), InteractionPattern::Sequential);
        assert_eq!(classify_pattern(2), InteractionPattern::Alternative);
    }

    #[test]
    fn test_sorted_non_increasing_correlation() {
        let stale = now() - Duration::days(30);
        let rows = vec![pair(1, stale), pair(10, now()), pair(5, now())];
        let scored = score_relationships(&rows, now());
        for window in scored.windows(2) {
            assert!(window[0].correlation >= window[1].correlation);
        }
    }

    #[test]
    fn test_ties_broken_by_frequency() {
        // Both cap at correlation 1.0; the higher frequency must come first.
        let rows = vec![pair(10, now()), pair(15, now())];
        let scored = score_relationships(&rows, now());
        assert_eq!(scored[0].frequency, 15);
    }
}
