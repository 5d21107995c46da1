// =====================================================================================
// TIER POLICY SERVICE
// =====================================================================================

use std::collections::HashSet;

use chrono::Duration;
use shared_config::{TimeoutSettings, WatchConfig};

use crate::models::Tier;

/// Built-in timeout budgets used in fixed deployment mode, in minutes.
pub const FIXED_CRITICAL_TIMEOUT_MIN: i64 = 10;
pub const FIXED_NORMAL_TIMEOUT_MIN: i64 = 60;
pub const FIXED_SLOW_TIMEOUT_MIN: i64 = 1440;

/// Resolves a tier to its timeout budget. The evaluator depends only on this
/// trait; deployments select the variant through configuration.
pub trait TimeoutPolicy: Send + Sync {
    fn timeout_for(&self, tier: Tier) -> Duration;
}

pub struct FixedTimeouts;

impl TimeoutPolicy for FixedTimeouts {
    fn timeout_for(&self, tier: Tier) -> Duration {
        let minutes = match tier {
            Tier::Critical => FIXED_CRITICAL_TIMEOUT_MIN,
            Tier::Normal => FIXED_NORMAL_TIMEOUT_MIN,
            Tier::Slow => FIXED_SLOW_TIMEOUT_MIN,
        };
        Duration::minutes(minutes)
    }
}

/// User-chosen per-tier minutes; range-checked at the configuration boundary
/// before this is ever constructed.
pub struct ConfiguredTimeouts {
    pub critical_minutes: i64,
    pub normal_minutes: i64,
    pub slow_minutes: i64,
}

impl TimeoutPolicy for ConfiguredTimeouts {
    fn timeout_for(&self, tier: Tier) -> Duration {
        let minutes = match tier {
            Tier::Critical => self.critical_minutes,
            Tier::Normal => self.normal_minutes,
            Tier::Slow => self.slow_minutes,
        };
        Duration::minutes(minutes)
    }
}

/// Tier membership and timeout resolution for one evaluation cycle. Built
/// fresh from the current configuration each cycle so live edits apply.
pub struct TierPolicy {
    critical: HashSet<String>,
    normal: HashSet<String>,
    slow: HashSet<String>,
    timeouts: Box<dyn TimeoutPolicy>,
}

impl TierPolicy {
    pub fn from_config(config: &WatchConfig) -> Self {
        let timeouts: Box<dyn TimeoutPolicy> = match config.timeouts {
            TimeoutSettings::Fixed => Box::new(FixedTimeouts),
            TimeoutSettings::Configured {
                critical_minutes,
                normal_minutes,
                slow_minutes,
            } => Box::new(ConfiguredTimeouts {
                critical_minutes,
                normal_minutes,
                slow_minutes,
            }),
        };

        Self {
            critical: config.critical_devices.iter().cloned().collect(),
            normal: config.normal_devices.iter().cloned().collect(),
            slow: config.slow_devices.iter().cloned().collect(),
            timeouts,
        }
    }

    /// Tier of a device id, or `None` when the device is not watched.
    /// A device listed in several sets resolves by precedence
    /// critical > slow > normal.
    pub fn tier_of(&self, device_id: &str) -> Option<Tier> {
        if self.critical.contains(device_id) {
            Some(Tier::Critical)
        } else if self.slow.contains(device_id) {
            Some(Tier::Slow)
        } else if self.normal.contains(device_id) {
            Some(Tier::Normal)
        } else {
            None
        }
    }

    pub fn timeout_of(&self, tier: Tier) -> Duration {
        self.timeouts.timeout_for(tier)
    }

    /// Union of the three tier sets, sorted for stable iteration.
    pub fn watched(&self) -> Vec<String> {
        let mut devices: Vec<String> = self
            .critical
            .iter()
            .chain(self.slow.iter())
            .chain(self.normal.iter())
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        devices.sort();
        devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_config::WatchConfig;

    fn config_with(critical: &[&str], normal: &[&str], slow: &[&str]) -> WatchConfig {
        WatchConfig {
            critical_devices: critical.iter().map(|s| s.to_string()).collect(),
            normal_devices: normal.iter().map(|s| s.to_string()).collect(),
            slow_devices: slow.iter().map(|s| s.to_string()).collect(),
            ..WatchConfig::default()
        }
    }

    #[test]
    fn test_tier_assignment() {
        let policy = TierPolicy::from_config(&config_with(&["a"], &["b"], &["c"]));
        assert_eq!(policy.tier_of("a"), Some(Tier::Critical));
        assert_eq!(policy.tier_of("b"), Some(Tier::Normal));
        assert_eq!(policy.tier_of("c"), Some(Tier::Slow));
        assert_eq!(policy.tier_of("d"), None);
    }

    #[test]
    fn test_tier_precedence_critical_beats_normal() {
        let policy = TierPolicy::from_config(&config_with(&["a"], &["a"], &[]));
        assert_eq!(policy.tier_of("a"), Some(Tier::Critical));
    }

    #[test]
    fn test_tier_precedence_slow_beats_normal() {
        let policy = TierPolicy::from_config(&config_with(&[], &["a"], &["a"]));
        assert_eq!(policy.tier_of("a"), Some(Tier::Slow));
    }

    #[test]
    fn test_fixed_timeouts() {
        let policy = TierPolicy::from_config(&config_with(&["a"], &[], &[]));
        assert_eq!(
            policy.timeout_of(Tier::Critical),
            Duration::minutes(FIXED_CRITICAL_TIMEOUT_MIN)
        );
        assert_eq!(
            policy.timeout_of(Tier::Normal),
            Duration::minutes(FIXED_NORMAL_TIMEOUT_MIN)
        );
        assert_eq!(
            policy.timeout_of(Tier::Slow),
            Duration::minutes(FIXED_SLOW_TIMEOUT_MIN)
        );
    }

    #[test]
    fn test_configured_timeouts() {
        let config = WatchConfig {
            timeouts: shared_config::TimeoutSettings::Configured {
                critical_minutes: 1,
                normal_minutes: 30,
                slow_minutes: 10_080,
            },
            ..config_with(&["a"], &[], &[])
        };
        let policy = TierPolicy::from_config(&config);
        assert_eq!(policy.timeout_of(Tier::Critical), Duration::minutes(1));
        assert_eq!(policy.timeout_of(Tier::Normal), Duration::minutes(30));
        assert_eq!(policy.timeout_of(Tier::Slow), Duration::minutes(10_080));
    }

    #[test]
    fn test_watched_is_deduplicated_union() {
        let policy = TierPolicy::from_config(&config_with(&["a", "b"], &["b", "c"], &["c"]));
        assert_eq!(policy.watched(), vec!["a", "b", "c"]);
    }
}
