// =====================================================================================
// WATCHDOG CELL - DEVICE HEALTH MONITORING COORDINATOR
// =====================================================================================
//
// The coordinator that decides whether each watched device is reachable:
// - Tier classification with a per-tier timeout budget
// - Last-known-good tracking fed by the catalog's state change feed
// - Fixed-cadence re-evaluation with startup grace
// - Edge-triggered alert lifecycle and outbound notifications
//
// =====================================================================================

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export commonly used types
pub use error::WatchdogError;
pub use models::{
    is_good_value, DeviceHealth, HealthReason, Tier, WatchEvent, WatchSummary,
};
pub use services::coordinator::{WatchdogCoordinator, EVALUATION_INTERVAL};
pub use services::liveness::LivenessTracker;
pub use services::tiers::{ConfiguredTimeouts, FixedTimeouts, TierPolicy, TimeoutPolicy};

pub use router::create_watchdog_router;
