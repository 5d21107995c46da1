use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signal values that count as "bad": anything else means the source is live.
pub const BAD_VALUES: [&str; 2] = ["unavailable", "unknown"];

pub fn is_good_value(value: &str) -> bool {
    !BAD_VALUES.contains(&value)
}

/// Severity class determining a device's timeout budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Critical,
    Normal,
    Slow,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Critical => "critical",
            Tier::Normal => "normal",
            Tier::Slow => "slow",
        };
        f.write_str(s)
    }
}

/// Why a device got its verdict. The `no_entities_*` codes cover devices
/// with no bound signal sources, which can only be judged by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthReason {
    Ok,
    Waiting,
    Timeout,
    NoEntitiesWaiting,
    NoEntitiesTimeout,
}

impl fmt::Display for HealthReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthReason::Ok => "ok",
            HealthReason::Waiting => "waiting",
            HealthReason::Timeout => "timeout",
            HealthReason::NoEntitiesWaiting => "no_entities_waiting",
            HealthReason::NoEntitiesTimeout => "no_entities_timeout",
        };
        f.write_str(s)
    }
}

/// Verdict for one device, produced fresh every evaluation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceHealth {
    pub device_id: String,
    pub device_name: String,
    pub tier: Tier,
    pub down: bool,
    pub reason: HealthReason,
    pub last_ok: Option<DateTime<Utc>>,
    pub timeout_minutes: i64,
}

/// Structured domain events emitted on verdict edges.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    DeviceDown {
        device_id: String,
        device_name: String,
        tier: Tier,
        reason: HealthReason,
        timeout_minutes: i64,
    },
    DeviceRecovered {
        device_id: String,
        device_name: String,
    },
}

/// Aggregate view derived from the published snapshot, never stored.
#[derive(Debug, Serialize)]
pub struct WatchSummary {
    pub watched: usize,
    pub down_count: usize,
    pub down_devices: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DevicesResponse {
    pub devices: std::collections::HashMap<String, DeviceHealth>,
    pub summary: WatchSummary,
}
