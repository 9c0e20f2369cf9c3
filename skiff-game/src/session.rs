//! Game session: the attempt/upgrade/economy state machine
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::LaunchTimer;
use crate::boat::{Boat, PartKind};
use crate::constants::{
    ALLOWANCE_TIER_ONE_LAST_ATTEMPT, ALLOWANCE_TIER_THREE_LAST_ATTEMPT,
    ALLOWANCE_TIER_TWO_LAST_ATTEMPT, BASE_DISTANCE, LAUNCH_DELAY, LEVEL_FACTOR_COEFFICIENT,
    LOG_GAME_COMPLETE, LOG_LAUNCH_REFUSED, LOG_LAUNCH_RESOLVED, LOG_LAUNCH_START,
    LOG_MILESTONE_PREFIX, LOG_RESET, LOG_SESSION_START, LOG_UPGRADE_PREFIX,
    LOG_UPGRADE_REFUSED_PREFIX, MAX_ATTEMPTS, STARTING_FUNDS,
};
use crate::milestones::{Milestone, credit_milestones, default_milestones};
use crate::result::{AttemptResult, VoyageSummary, voyage_summary};

/// Reason an upgrade request was refused. All refusals are non-fatal; the
/// session state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpgradeRefusal {
    #[error("upgrade allowance for this attempt is spent")]
    AllowanceSpent,
    #[error("part is already at maximum level")]
    MaxLevel,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("game is complete")]
    GameComplete,
}

/// One run of the incremental boat-racing loop.
///
/// The session is explicitly constructed and exclusively owned by the
/// embedding application; there is no ambient global instance. All rule
/// violations surface as refusal values, never as panics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    seed: u64,
    /// Current attempt number, 1-based. Frozen once the game completes.
    attempt: u32,
    funds: i64,
    game_complete: bool,
    launching: bool,
    upgrades_this_attempt: u32,
    boat: Boat,
    milestones: Vec<Milestone>,
    history: Vec<AttemptResult>,
    /// Human-readable event trace; a debugging aid, not part of the
    /// functional contract.
    pub logs: Vec<String>,
    #[serde(skip)]
    rng: Option<ChaCha20Rng>,
}

impl GameSession {
    /// Create a session from an explicit seed. The four hidden multipliers
    /// are drawn immediately from the seeded stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let boat = Boat::new(&mut rng);
        Self {
            seed,
            attempt: 1,
            funds: STARTING_FUNDS,
            game_complete: false,
            launching: false,
            upgrades_this_attempt: 0,
            boat,
            milestones: default_milestones(),
            history: Vec::new(),
            logs: vec![String::from(LOG_SESSION_START)],
            rng: Some(rng),
        }
    }

    /// Create a session with a fresh random seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u64>())
    }

    // Read surface ---------------------------------------------------------

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub const fn funds(&self) -> i64 {
        self.funds
    }

    #[must_use]
    pub const fn is_game_complete(&self) -> bool {
        self.game_complete
    }

    #[must_use]
    pub const fn is_launching(&self) -> bool {
        self.launching
    }

    #[must_use]
    pub const fn upgrades_this_attempt(&self) -> u32 {
        self.upgrades_this_attempt
    }

    #[must_use]
    pub const fn boat(&self) -> &Boat {
        &self.boat
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Completed attempts, in attempt order.
    #[must_use]
    pub fn history(&self) -> &[AttemptResult] {
        &self.history
    }

    /// Attempts left including the current one.
    #[must_use]
    pub const fn attempts_remaining(&self) -> u32 {
        MAX_ATTEMPTS - self.attempt + 1
    }

    #[must_use]
    pub const fn can_launch(&self) -> bool {
        !self.launching && !self.game_complete
    }

    /// Maximum upgrades purchasable during the current attempt. The final
    /// attempt is unlimited.
    #[must_use]
    pub const fn upgrade_allowance(&self) -> u32 {
        match self.attempt {
            0..=ALLOWANCE_TIER_ONE_LAST_ATTEMPT => 1,
            ..=ALLOWANCE_TIER_TWO_LAST_ATTEMPT => 2,
            ..=ALLOWANCE_TIER_THREE_LAST_ATTEMPT => 3,
            _ => u32::MAX,
        }
    }

    /// Aggregates for the result screen.
    #[must_use]
    pub fn summary(&self) -> VoyageSummary {
        voyage_summary(&self.history, self.funds)
    }

    /// Test-only visibility into a part's hidden multiplier.
    #[doc(hidden)]
    #[must_use]
    pub fn hidden_multiplier_for_testing(&self, kind: PartKind) -> f64 {
        self.boat.part(kind).hidden_multiplier
    }

    // Distance -------------------------------------------------------------

    /// Travel distance for the current boat state. Pure: deterministic for
    /// a fixed boat.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compute_distance(&self) -> u32 {
        let mut total_multiplier = 1.0_f64;
        for kind in PartKind::ALL {
            let part = self.boat.part(kind);
            let level = f64::from(part.level);
            total_multiplier +=
                level * (level + 1.0) * LEVEL_FACTOR_COEFFICIENT * part.hidden_multiplier;
        }
        (BASE_DISTANCE * total_multiplier).floor() as u32
    }

    // Launch ---------------------------------------------------------------

    /// Enter the launching state. Returns false, with no other state
    /// change, when a launch is already pending or the game is over.
    pub fn begin_launch(&mut self) -> bool {
        if !self.can_launch() {
            self.logs.push(String::from(LOG_LAUNCH_REFUSED));
            return false;
        }
        self.launching = true;
        self.logs.push(String::from(LOG_LAUNCH_START));
        true
    }

    /// Apply the deferred launch effects and record the attempt. Intended
    /// to run after the launch delay has elapsed; tick-driven embedders can
    /// call [`Self::begin_launch`] and this pair directly instead of
    /// awaiting [`Self::launch`]. Returns `None` when no launch is pending.
    pub fn resolve_launch(&mut self) -> Option<AttemptResult> {
        if !self.launching {
            return None;
        }
        let distance = self.compute_distance();
        let payout = credit_milestones(&self.milestones, distance);
        for &index in &payout.indices {
            self.logs.push(format!("{LOG_MILESTONE_PREFIX}{index}"));
        }
        self.funds += payout.reward;

        let result = AttemptResult {
            attempt: self.attempt,
            distance,
            money_earned: payout.reward,
            milestones_hit: payout.indices,
            part_levels: self.boat.levels(),
        };
        self.history.push(result.clone());

        if self.attempt >= MAX_ATTEMPTS {
            self.game_complete = true;
            self.logs.push(String::from(LOG_GAME_COMPLETE));
        } else {
            self.attempt += 1;
            self.upgrades_this_attempt = 0;
        }
        self.launching = false;
        self.logs.push(String::from(LOG_LAUNCH_RESOLVED));
        Some(result)
    }

    /// Run one full launch: enter the launching state, wait out the launch
    /// delay through `timer`, then resolve.
    ///
    /// When the precondition fails (already launching, or game complete)
    /// the returned future never resolves, matching the reference
    /// behavior; callers must gate on [`Self::can_launch`] rather than
    /// rely on rejection.
    pub async fn launch<T: LaunchTimer>(&mut self, timer: &T) -> AttemptResult {
        if !self.begin_launch() {
            return std::future::pending().await;
        }
        timer.wait(LAUNCH_DELAY).await;
        match self.resolve_launch() {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }

    // Upgrades -------------------------------------------------------------

    /// Cost of the next level for a part, or 0 at max level. Pure.
    #[must_use]
    pub fn peek_upgrade_cost(&self, kind: PartKind) -> i64 {
        let next_level = usize::from(self.boat.part(kind).level) + 1;
        kind.cost_table().get(next_level).copied().unwrap_or(0)
    }

    /// Whether an upgrade for this part would currently succeed.
    #[must_use]
    pub fn can_upgrade(&self, kind: PartKind) -> bool {
        self.check_upgrade(kind).is_ok()
    }

    fn check_upgrade(&self, kind: PartKind) -> Result<i64, UpgradeRefusal> {
        if self.game_complete {
            return Err(UpgradeRefusal::GameComplete);
        }
        if self.upgrades_this_attempt >= self.upgrade_allowance() {
            return Err(UpgradeRefusal::AllowanceSpent);
        }
        let next_level = usize::from(self.boat.part(kind).level) + 1;
        let Some(&cost) = kind.cost_table().get(next_level) else {
            return Err(UpgradeRefusal::MaxLevel);
        };
        if self.funds < cost {
            return Err(UpgradeRefusal::InsufficientFunds);
        }
        Ok(cost)
    }

    /// Purchase the next level for a part. Returns false on refusal with no
    /// state change beyond the event trace.
    pub fn upgrade(&mut self, kind: PartKind) -> bool {
        self.try_upgrade(kind).is_ok()
    }

    /// [`Self::upgrade`] with the refusal reason surfaced.
    ///
    /// # Errors
    ///
    /// Returns the [`UpgradeRefusal`] describing why the purchase was
    /// rejected; funds, levels, and counters are untouched on error.
    pub fn try_upgrade(&mut self, kind: PartKind) -> Result<(), UpgradeRefusal> {
        match self.check_upgrade(kind) {
            Ok(cost) => {
                self.funds -= cost;
                self.boat.part_mut(kind).level += 1;
                self.upgrades_this_attempt += 1;
                self.logs.push(format!("{LOG_UPGRADE_PREFIX}{}", kind.key()));
                Ok(())
            }
            Err(refusal) => {
                self.logs
                    .push(format!("{LOG_UPGRADE_REFUSED_PREFIX}{}", kind.key()));
                Err(refusal)
            }
        }
    }

    // Reset ----------------------------------------------------------------

    /// Return the session to its initial state with a brand-new boat. The
    /// hidden multipliers are redrawn from the session RNG stream; the
    /// previous draws are discarded.
    pub fn reset(&mut self) {
        let mut rng = self
            .rng
            .take()
            .unwrap_or_else(|| ChaCha20Rng::seed_from_u64(self.seed));
        self.boat = Boat::new(&mut rng);
        self.rng = Some(rng);
        self.attempt = 1;
        self.funds = STARTING_FUNDS;
        self.game_complete = false;
        self.launching = false;
        self.upgrades_this_attempt = 0;
        self.history.clear();
        self.logs.push(String::from(LOG_RESET));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::time::Duration;

    /// Timer that skips the launch animation entirely.
    struct InstantTimer;

    impl LaunchTimer for InstantTimer {
        fn wait(&self, _delay: Duration) -> impl Future<Output = ()> {
            std::future::ready(())
        }
    }

    fn completed_session() -> GameSession {
        let mut session = GameSession::new(5);
        while !session.is_game_complete() {
            assert!(session.begin_launch());
            session.resolve_launch().unwrap();
        }
        session
    }

    #[test]
    fn fresh_session_travels_exactly_base_distance() {
        for seed in [0, 1, 42, 0xDEAD_BEEF] {
            let session = GameSession::new(seed);
            assert_eq!(session.compute_distance(), 90);
        }
    }

    #[test]
    fn fresh_session_initial_state() {
        let session = GameSession::new(3);
        assert_eq!(session.attempt(), 1);
        assert_eq!(session.funds(), 100);
        assert!(!session.is_game_complete());
        assert!(!session.is_launching());
        assert_eq!(session.upgrades_this_attempt(), 0);
        assert_eq!(session.attempts_remaining(), 10);
        assert!(session.history().is_empty());
        assert!(session.can_launch());
        assert_eq!(session.logs[0], LOG_SESSION_START);
    }

    #[test]
    fn distance_is_monotone_in_each_part_level() {
        for kind in PartKind::ALL {
            let mut session = GameSession::new(17);
            let mut previous = session.compute_distance();
            for level in 1..=kind.max_level() {
                session.boat.part_mut(kind).level = level;
                let distance = session.compute_distance();
                assert!(distance >= previous, "{kind} level {level}");
                previous = distance;
            }
        }
    }

    #[test]
    fn worked_first_attempt_scenario() {
        let mut session = GameSession::new(11);
        session.boat.part_mut(PartKind::Steering).hidden_multiplier = 1.0;

        assert!(session.upgrade(PartKind::Steering));
        assert_eq!(session.funds(), 80);
        assert_eq!(session.boat().steering.level, 1);

        // Allowance for attempt 1 is spent; nothing else may be bought.
        assert!(!session.upgrade(PartKind::Hull));
        assert_eq!(session.funds(), 80);
        assert_eq!(session.boat().hull.level, 0);

        assert!(session.begin_launch());
        assert!(session.is_launching());
        let result = session.resolve_launch().unwrap();
        assert_eq!(result.distance, 117);
        assert_eq!(result.milestones_hit.as_slice(), &[0]);
        assert_eq!(result.money_earned, 50);
        assert_eq!(result.part_levels.steering, 1);
        assert_eq!(session.funds(), 130);
        assert_eq!(session.attempt(), 2);
        assert_eq!(session.upgrades_this_attempt(), 0);
        assert!(!session.is_launching());
    }

    #[test]
    fn allowance_follows_attempt_tiers() {
        let mut session = GameSession::new(1);
        for (attempt, allowance) in [(1, 1), (3, 1), (4, 2), (6, 2), (7, 3), (9, 3)] {
            session.attempt = attempt;
            assert_eq!(session.upgrade_allowance(), allowance, "attempt {attempt}");
        }
        session.attempt = 10;
        assert_eq!(session.upgrade_allowance(), u32::MAX);
    }

    #[test]
    fn final_attempt_allows_unlimited_upgrades() {
        let mut session = GameSession::new(2);
        session.attempt = 10;
        session.funds = 100_000;
        let mut purchased = 0;
        for kind in PartKind::ALL {
            while session.upgrade(kind) {
                purchased += 1;
            }
        }
        // Every part driven from level 0 to 4.
        assert_eq!(purchased, 16);
        for kind in PartKind::ALL {
            assert_eq!(session.boat().part(kind).level, kind.max_level());
        }
    }

    #[test]
    fn refusals_leave_state_untouched() {
        let mut session = GameSession::new(9);

        session.funds = 10;
        assert_eq!(
            session.try_upgrade(PartKind::Steering),
            Err(UpgradeRefusal::InsufficientFunds)
        );
        assert_eq!(session.funds(), 10);
        assert_eq!(session.upgrades_this_attempt(), 0);

        session.funds = 10_000;
        session.boat.part_mut(PartKind::Sail).level = PartKind::Sail.max_level();
        assert_eq!(
            session.try_upgrade(PartKind::Sail),
            Err(UpgradeRefusal::MaxLevel)
        );
        assert!(!session.can_upgrade(PartKind::Sail));
        assert_eq!(session.peek_upgrade_cost(PartKind::Sail), 0);

        assert!(session.upgrade(PartKind::Hull));
        assert_eq!(
            session.try_upgrade(PartKind::Engine),
            Err(UpgradeRefusal::AllowanceSpent)
        );
        assert_eq!(session.boat().engine.level, 0);
    }

    #[test]
    fn peek_cost_tracks_next_level() {
        let mut session = GameSession::new(8);
        assert_eq!(session.peek_upgrade_cost(PartKind::Steering), 20);
        assert!(session.upgrade(PartKind::Steering));
        assert_eq!(session.peek_upgrade_cost(PartKind::Steering), 45);
    }

    #[test]
    fn upgrade_never_drives_funds_negative() {
        let mut session = GameSession::new(21);
        session.attempt = 10; // unlimited allowance
        session.funds = 55;
        for kind in PartKind::ALL {
            while session.upgrade(kind) {}
        }
        assert!(session.funds() >= 0);
    }

    #[test]
    fn allowance_resets_when_next_attempt_begins() {
        let mut session = GameSession::new(13);
        assert!(session.upgrade(PartKind::Steering));
        assert!(!session.can_upgrade(PartKind::Sail));

        assert!(session.begin_launch());
        session.resolve_launch().unwrap();

        assert_eq!(session.attempt(), 2);
        assert_eq!(session.upgrades_this_attempt(), 0);
        assert!(session.can_upgrade(PartKind::Sail));
    }

    #[test]
    fn resolve_without_begin_is_a_no_op() {
        let mut session = GameSession::new(4);
        assert!(session.resolve_launch().is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.attempt(), 1);
    }

    #[test]
    fn begin_launch_rejected_while_pending() {
        let mut session = GameSession::new(4);
        assert!(session.begin_launch());
        assert!(!session.can_launch());
        assert!(!session.begin_launch());
        assert!(session.logs.iter().any(|l| l == LOG_LAUNCH_REFUSED));
        // The pending launch still resolves normally.
        assert!(session.resolve_launch().is_some());
    }

    #[test]
    fn tenth_launch_completes_and_freezes_the_session() {
        let mut session = completed_session();
        assert!(session.is_game_complete());
        assert_eq!(session.attempt(), 10);
        assert_eq!(session.history().len(), 10);
        assert!(session.logs.iter().any(|l| l == LOG_GAME_COMPLETE));

        assert!(!session.begin_launch());
        assert!(!session.upgrade(PartKind::Steering));
        assert_eq!(
            session.try_upgrade(PartKind::Steering),
            Err(UpgradeRefusal::GameComplete)
        );
        assert_eq!(session.attempt(), 10);
        assert_eq!(session.history().len(), 10);
    }

    #[test]
    fn history_records_attempts_in_order() {
        let mut session = GameSession::new(6);
        for expected_attempt in 1..=3 {
            assert!(session.begin_launch());
            let result = session.resolve_launch().unwrap();
            assert_eq!(result.attempt, expected_attempt);
        }
        let attempts: Vec<u32> = session.history().iter().map(|r| r.attempt).collect();
        assert_eq!(attempts, vec![1, 2, 3]);
    }

    #[test]
    fn reset_returns_to_initial_state_with_new_draws() {
        let mut session = GameSession::new(31);
        let before: Vec<f64> = PartKind::ALL
            .iter()
            .map(|&k| session.hidden_multiplier_for_testing(k))
            .collect();

        assert!(session.upgrade(PartKind::Steering));
        assert!(session.begin_launch());
        session.resolve_launch().unwrap();
        session.reset();

        assert_eq!(session.attempt(), 1);
        assert_eq!(session.funds(), 100);
        assert!(!session.is_game_complete());
        assert!(!session.is_launching());
        assert_eq!(session.upgrades_this_attempt(), 0);
        assert!(session.history().is_empty());
        assert_eq!(session.compute_distance(), 90);

        let after: Vec<f64> = PartKind::ALL
            .iter()
            .map(|&k| session.hidden_multiplier_for_testing(k))
            .collect();
        assert_ne!(before, after);
        for multiplier in after {
            assert!((0.5..2.0).contains(&multiplier));
        }
    }

    #[test]
    fn summary_reflects_history_and_funds() {
        let mut session = GameSession::new(12);
        assert!(session.begin_launch());
        session.resolve_launch().unwrap();
        let summary = session.summary();
        assert_eq!(summary.attempts_played, 1);
        assert_eq!(summary.best_distance, 90);
        assert_eq!(summary.final_funds, session.funds());
    }

    #[test]
    fn session_snapshot_roundtrips_through_json() {
        let mut session = GameSession::new(77);
        assert!(session.upgrade(PartKind::Engine));
        let json = serde_json::to_string(&session).unwrap();
        let restored: GameSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.attempt(), session.attempt());
        assert_eq!(restored.funds(), session.funds());
        assert_eq!(restored.boat().engine.level, 1);
        assert_eq!(restored.compute_distance(), session.compute_distance());
    }

    #[tokio::test]
    async fn launch_future_resolves_one_attempt() {
        let mut session = GameSession::new(14);
        let result = session.launch(&InstantTimer).await;
        assert_eq!(result.attempt, 1);
        assert_eq!(result.distance, 90);
        assert_eq!(session.attempt(), 2);
        assert_eq!(session.history().len(), 1);
        assert!(!session.is_launching());
    }

    #[tokio::test]
    async fn launch_after_completion_never_resolves() {
        let mut session = completed_session();
        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            session.launch(&InstantTimer),
        )
        .await;
        assert!(outcome.is_err(), "launch future must hang when refused");
    }
}
