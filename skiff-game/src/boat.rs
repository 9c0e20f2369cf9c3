//! Boat parts, levels, and upgrade cost tables
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{HIDDEN_MULTIPLIER_MAX, HIDDEN_MULTIPLIER_MIN};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PartKind {
    Hull,
    Sail,
    Engine,
    Steering,
}

impl PartKind {
    /// The fixed part set, in distance-formula order.
    pub const ALL: [Self; 4] = [Self::Hull, Self::Sail, Self::Engine, Self::Steering];

    /// Get the translation key for this part
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hull => "hull",
            Self::Sail => "sail",
            Self::Engine => "engine",
            Self::Steering => "steering",
        }
    }

    /// Upgrade cost by target level. Index 0 is the free starting level and
    /// is unreachable via upgrade.
    #[must_use]
    pub const fn cost_table(self) -> &'static [i64] {
        match self {
            Self::Hull => &[0, 30, 70, 150, 320],
            Self::Sail => &[0, 25, 55, 120, 250],
            Self::Engine => &[0, 35, 80, 170, 350],
            Self::Steering => &[0, 20, 45, 95, 200],
        }
    }

    /// Highest level this part can reach via upgrades.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_level(self) -> u8 {
        (self.cost_table().len() - 1) as u8
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A single upgradeable component of the boat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoatPart {
    pub level: u8,
    /// Balance lever rolled once per session; never part of the
    /// player-facing read surface.
    pub(crate) hidden_multiplier: f64,
}

/// The four named components making up one boat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boat {
    pub hull: BoatPart,
    pub sail: BoatPart,
    pub engine: BoatPart,
    pub steering: BoatPart,
}

impl Boat {
    /// Build a fresh level-0 boat, drawing each hidden multiplier
    /// independently from the session RNG.
    pub(crate) fn new<R: Rng>(rng: &mut R) -> Self {
        let mut draw = || BoatPart {
            level: 0,
            hidden_multiplier: rng.gen_range(HIDDEN_MULTIPLIER_MIN..HIDDEN_MULTIPLIER_MAX),
        };
        Self {
            hull: draw(),
            sail: draw(),
            engine: draw(),
            steering: draw(),
        }
    }

    #[must_use]
    pub fn part(&self, kind: PartKind) -> &BoatPart {
        match kind {
            PartKind::Hull => &self.hull,
            PartKind::Sail => &self.sail,
            PartKind::Engine => &self.engine,
            PartKind::Steering => &self.steering,
        }
    }

    pub(crate) fn part_mut(&mut self, kind: PartKind) -> &mut BoatPart {
        match kind {
            PartKind::Hull => &mut self.hull,
            PartKind::Sail => &mut self.sail,
            PartKind::Engine => &mut self.engine,
            PartKind::Steering => &mut self.steering,
        }
    }

    /// Snapshot of all four part levels.
    #[must_use]
    pub const fn levels(&self) -> PartLevels {
        PartLevels {
            hull: self.hull.level,
            sail: self.sail.level,
            engine: self.engine.level,
            steering: self.steering.level,
        }
    }
}

/// Per-part level snapshot, recorded into each attempt result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartLevels {
    pub hull: u8,
    pub sail: u8,
    pub engine: u8,
    pub steering: u8,
}
