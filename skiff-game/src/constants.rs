//! Centralized balance and tuning constants for Skiff game logic.
//!
//! These values define the deterministic math for the core loop. Keeping
//! them together ensures gameplay can only be adjusted via code changes
//! reviewed in version control, rather than through external assets.

use std::time::Duration;

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_SESSION_START: &str = "log.session.start";
pub(crate) const LOG_LAUNCH_START: &str = "log.launch.start";
pub(crate) const LOG_LAUNCH_REFUSED: &str = "log.launch.refused";
pub(crate) const LOG_LAUNCH_RESOLVED: &str = "log.launch.resolved";
pub(crate) const LOG_MILESTONE_PREFIX: &str = "log.milestone.";
pub(crate) const LOG_UPGRADE_PREFIX: &str = "log.upgrade.";
pub(crate) const LOG_UPGRADE_REFUSED_PREFIX: &str = "log.upgrade.refused.";
pub(crate) const LOG_GAME_COMPLETE: &str = "log.game.complete";
pub(crate) const LOG_RESET: &str = "log.reset";

// Voyage tuning ------------------------------------------------------------
pub(crate) const BASE_DISTANCE: f64 = 90.0;
/// Quadratic level scaling: each part contributes level * (level + 1) * this.
pub(crate) const LEVEL_FACTOR_COEFFICIENT: f64 = 0.15;
pub(crate) const HIDDEN_MULTIPLIER_MIN: f64 = 0.5;
pub(crate) const HIDDEN_MULTIPLIER_MAX: f64 = 2.0;

// Economy tuning -----------------------------------------------------------
pub(crate) const STARTING_FUNDS: i64 = 100;
pub(crate) const MAX_ATTEMPTS: u32 = 10;

// Upgrade allowance tiers (attempt range upper bounds, inclusive) ----------
pub(crate) const ALLOWANCE_TIER_ONE_LAST_ATTEMPT: u32 = 3;
pub(crate) const ALLOWANCE_TIER_TWO_LAST_ATTEMPT: u32 = 6;
pub(crate) const ALLOWANCE_TIER_THREE_LAST_ATTEMPT: u32 = 9;

// Launch timing ------------------------------------------------------------
/// Length of the launch animation before attempt effects land.
pub(crate) const LAUNCH_DELAY: Duration = Duration::from_secs(2);
