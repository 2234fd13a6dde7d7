//! Analytic models: agent detection, aggregation, delegation graphs,
//! message events, timeline bucketing, and relationship scoring.
//!
//! Everything here is pure with respect to wall-clock time; functions that
//! need "now" take it as an argument so results are reproducible.

pub mod aggregator;
pub mod delegation;
pub mod detector;
pub mod events;
pub mod loader;
pub mod relationships;
pub mod timeline;

pub use aggregator::AgentStatsAggregator;
pub use delegation::DelegationAnalyzer;
pub use detector::{detect_agent, Detection};
pub use events::extract_message_events;
pub use loader::{load_snapshot, parse_time_filter};
pub use relationships::score_relationships;
pub use timeline::bucketize;
