pub mod coordinator;
pub mod liveness;
pub mod tiers;

pub use coordinator::WatchdogCoordinator;
pub use liveness::LivenessTracker;
pub use tiers::TierPolicy;
