use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Timeout minutes accepted from configuration: one minute to one week.
pub const MIN_TIMEOUT_MINUTES: i64 = 1;
pub const MAX_TIMEOUT_MINUTES: i64 = 10_080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("timeout for {tier} tier is {minutes} minutes, allowed range is {MIN_TIMEOUT_MINUTES}..={MAX_TIMEOUT_MINUTES}")]
    TimeoutOutOfRange { tier: String, minutes: i64 },
}

/// Per-tier timeout source. `Fixed` uses the built-in constants resolved by
/// the watchdog's timeout policy; `Configured` carries user-chosen minutes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeoutSettings {
    Fixed,
    Configured {
        critical_minutes: i64,
        normal_minutes: i64,
        slow_minutes: i64,
    },
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        TimeoutSettings::Fixed
    }
}

/// Watchdog configuration: which devices are watched in which tier, and how
/// transitions are forwarded. Re-read by the coordinator at every cycle so
/// live edits apply without a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default)]
    pub critical_devices: Vec<String>,
    #[serde(default)]
    pub normal_devices: Vec<String>,
    #[serde(default)]
    pub slow_devices: Vec<String>,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    /// Outbound target as `namespace.action`; empty disables forwarding.
    #[serde(default)]
    pub notify_target: String,
    #[serde(default = "default_notify_recovered")]
    pub notify_recovered: bool,
}

fn default_notify_recovered() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            critical_devices: Vec::new(),
            normal_devices: Vec::new(),
            slow_devices: Vec::new(),
            timeouts: TimeoutSettings::default(),
            notify_target: String::new(),
            notify_recovered: default_notify_recovered(),
        }
    }
}

impl WatchConfig {
    /// Rejects out-of-range timeouts before they can reach the coordinator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let TimeoutSettings::Configured {
            critical_minutes,
            normal_minutes,
            slow_minutes,
        } = self.timeouts
        {
            for (tier, minutes) in [
                ("critical", critical_minutes),
                ("normal", normal_minutes),
                ("slow", slow_minutes),
            ] {
                if !(MIN_TIMEOUT_MINUTES..=MAX_TIMEOUT_MINUTES).contains(&minutes) {
                    return Err(ConfigError::TimeoutOutOfRange {
                        tier: tier.to_string(),
                        minutes,
                    });
                }
            }
        }
        Ok(())
    }

    /// A device is watched iff it appears in at least one tier set.
    pub fn is_watched(&self, device_id: &str) -> bool {
        self.critical_devices.iter().any(|d| d == device_id)
            || self.normal_devices.iter().any(|d| d == device_id)
            || self.slow_devices.iter().any(|d| d == device_id)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL the webhook messenger posts to; empty falls back to
    /// log-only delivery.
    pub notify_webhook_url: String,
    pub watch: WatchConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let notify_webhook_url = env::var("NOTIFY_WEBHOOK_URL").unwrap_or_else(|_| {
            warn!("NOTIFY_WEBHOOK_URL not set, outbound notifications will be log-only");
            String::new()
        });

        let watch = WatchConfig {
            critical_devices: parse_id_list(&env_or_empty("WATCH_CRITICAL_DEVICES")),
            normal_devices: parse_id_list(&env_or_empty("WATCH_NORMAL_DEVICES")),
            slow_devices: parse_id_list(&env_or_empty("WATCH_SLOW_DEVICES")),
            timeouts: timeouts_from_env(),
            notify_target: env_or_empty("WATCH_NOTIFY_TARGET"),
            notify_recovered: env::var("WATCH_NOTIFY_RECOVERED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or_else(|_| default_notify_recovered()),
        };

        let mut config = Self {
            notify_webhook_url,
            watch,
        };

        if let Err(e) = config.watch.validate() {
            warn!("watch configuration invalid, falling back to fixed timeouts: {e}");
            config.watch.timeouts = TimeoutSettings::Fixed;
        }

        config
    }
}

fn env_or_empty(key: &str) -> String {
    env::var(key).unwrap_or_default()
}

fn timeouts_from_env() -> TimeoutSettings {
    match env::var("WATCH_TIMEOUT_MODE").as_deref() {
        Ok("configured") => TimeoutSettings::Configured {
            critical_minutes: env_minutes("WATCH_CRITICAL_TIMEOUT_MINUTES", 10),
            normal_minutes: env_minutes("WATCH_NORMAL_TIMEOUT_MINUTES", 60),
            slow_minutes: env_minutes("WATCH_SLOW_TIMEOUT_MINUTES", 1440),
        },
        _ => TimeoutSettings::Fixed,
    }
}

fn env_minutes(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated device id list, trimming blanks.
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_list() {
        assert_eq!(
            parse_id_list("sensor_hub, gateway ,"),
            vec!["sensor_hub".to_string(), "gateway".to_string()]
        );
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_validate_accepts_fixed_mode() {
        let config = WatchConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeout() {
        let config = WatchConfig {
            timeouts: TimeoutSettings::Configured {
                critical_minutes: 0,
                normal_minutes: 60,
                slow_minutes: 1440,
            },
            ..WatchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = WatchConfig {
            timeouts: TimeoutSettings::Configured {
                critical_minutes: 10,
                normal_minutes: 60,
                slow_minutes: 10_081,
            },
            ..WatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_range_bounds() {
        let config = WatchConfig {
            timeouts: TimeoutSettings::Configured {
                critical_minutes: 1,
                normal_minutes: 60,
                slow_minutes: 10_080,
            },
            ..WatchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_watched_across_tiers() {
        let config = WatchConfig {
            critical_devices: vec!["a".to_string()],
            normal_devices: vec!["b".to_string()],
            slow_devices: vec!["c".to_string()],
            ..WatchConfig::default()
        };
        assert!(config.is_watched("a"));
        assert!(config.is_watched("b"));
        assert!(config.is_watched("c"));
        assert!(!config.is_watched("d"));
    }
}
