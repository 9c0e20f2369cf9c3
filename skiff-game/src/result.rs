//! Attempt records and end-of-voyage summary
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::boat::PartLevels;

/// Immutable record of one completed launch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Attempt number at the time of launch (1-based).
    pub attempt: u32,
    pub distance: u32,
    pub money_earned: i64,
    /// Milestone-table indices credited, in table order.
    pub milestones_hit: SmallVec<[usize; 4]>,
    /// Part levels at the moment the attempt resolved.
    pub part_levels: PartLevels,
}

/// Aggregates over a run's attempt history for the result screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoyageSummary {
    pub attempts_played: u32,
    pub best_distance: u32,
    pub total_earned: i64,
    pub final_funds: i64,
}

/// Summarize a run from its history and closing funds.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn voyage_summary(history: &[AttemptResult], funds: i64) -> VoyageSummary {
    VoyageSummary {
        attempts_played: history.len() as u32,
        best_distance: history.iter().map(|r| r.distance).max().unwrap_or(0),
        total_earned: history.iter().map(|r| r.money_earned).sum(),
        final_funds: funds,
    }
}
