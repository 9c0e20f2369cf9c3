//! Skiff Game Engine
//!
//! Platform-agnostic core logic for the Skiff incremental boat-racing game.
//! This crate provides the whole attempt/upgrade/economy loop without UI or
//! platform-specific dependencies: the embedding application owns a
//! [`GameSession`], reads its state, and invokes its operations.

pub mod boat;
pub mod constants;
pub mod milestones;
pub mod result;
pub mod session;

// Re-export commonly used types
pub use boat::{Boat, BoatPart, PartKind, PartLevels};
pub use milestones::{Milestone, MilestonePayout, credit_milestones, default_milestones};
pub use result::{AttemptResult, VoyageSummary, voyage_summary};
pub use session::{GameSession, UpgradeRefusal};

use std::future::Future;
use std::time::Duration;

/// Trait for abstracting the launch-animation delay
/// Platform-specific implementations should provide this
pub trait LaunchTimer {
    /// Wait out the given delay before launch effects become observable.
    fn wait(&self, delay: Duration) -> impl Future<Output = ()>;
}

/// [`LaunchTimer`] backed by the tokio clock.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "async")]
impl LaunchTimer for TokioTimer {
    fn wait(&self, delay: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(delay)
    }
}
