//! Distance milestones and cumulative payout crediting
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A distance threshold that pays out when an attempt reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub distance: u32,
    pub reward: i64,
    pub label: String,
}

/// The fixed milestone table, in ascending distance order.
#[must_use]
pub fn default_milestones() -> Vec<Milestone> {
    [
        (100, 50, "$50"),
        (200, 100, "$100"),
        (400, 200, "$200"),
        (800, 1000, "$1000"),
    ]
    .into_iter()
    .map(|(distance, reward, label)| Milestone {
        distance,
        reward,
        label: String::from(label),
    })
    .collect()
}

/// Indices and total reward for every milestone a distance reaches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestonePayout {
    /// Milestone-table indices credited, in table order.
    pub indices: SmallVec<[usize; 4]>,
    pub reward: i64,
}

/// Credit every milestone whose threshold is at or below the distance.
/// Thresholds are cumulative: reaching 250 credits both 100 and 200.
#[must_use]
pub fn credit_milestones(milestones: &[Milestone], distance: u32) -> MilestonePayout {
    let mut payout = MilestonePayout::default();
    for (index, milestone) in milestones.iter().enumerate() {
        if distance >= milestone.distance {
            payout.indices.push(index);
            payout.reward += milestone.reward;
        }
    }
    payout
}
