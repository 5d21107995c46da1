// =====================================================================================
// WATCHDOG COORDINATOR
// =====================================================================================
//
// Owns all monitoring state for one watch group: liveness baselines, the
// previous-verdict map used for edge detection, and the published snapshot.
// Two producers feed it — the catalog's state change stream and the periodic
// evaluation tick — both handled on a single run loop task.
//
// =====================================================================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use catalog_cell::{DeviceCatalog, StateChange};
use notify_cell::{AlertBoard, Messenger, NotifyTarget};
use shared_config::WatchConfig;

use crate::error::WatchdogError;
use crate::models::{
    is_good_value, DeviceHealth, HealthReason, Tier, WatchEvent, WatchSummary,
};
use crate::services::liveness::LivenessTracker;
use crate::services::tiers::TierPolicy;

/// Fixed evaluation cadence. Device timeouts are configurable; the tick is not.
pub const EVALUATION_INTERVAL: Duration = Duration::from_secs(30);

const ALERT_TITLE: &str = "Device Watch";
const EVENT_CAPACITY: usize = 64;

pub struct WatchdogCoordinator {
    instance_id: String,
    config: RwLock<WatchConfig>,
    catalog: Arc<dyn DeviceCatalog>,
    alerts: Arc<AlertBoard>,
    messenger: Arc<dyn Messenger>,
    events: broadcast::Sender<WatchEvent>,
    liveness: LivenessTracker,
    prev_down: RwLock<HashMap<String, bool>>,
    snapshot: RwLock<Arc<HashMap<String, DeviceHealth>>>,
    is_shutdown: RwLock<bool>,
}

impl WatchdogCoordinator {
    pub fn new(
        instance_id: impl Into<String>,
        config: WatchConfig,
        catalog: Arc<dyn DeviceCatalog>,
        alerts: Arc<AlertBoard>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            instance_id: instance_id.into(),
            config: RwLock::new(config),
            catalog,
            alerts,
            messenger,
            events,
            liveness: LivenessTracker::new(),
            prev_down: RwLock::new(HashMap::new()),
            snapshot: RwLock::new(Arc::new(HashMap::new())),
            is_shutdown: RwLock::new(false),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WatchEvent> {
        self.events.subscribe()
    }

    pub fn alert_board(&self) -> Arc<AlertBoard> {
        self.alerts.clone()
    }

    pub async fn config(&self) -> WatchConfig {
        self.config.read().await.clone()
    }

    /// Live configuration edit; validated so an out-of-range timeout never
    /// reaches the evaluator. Applies from the next cycle onward.
    pub async fn update_config(&self, config: WatchConfig) -> Result<(), WatchdogError> {
        config.validate()?;
        let mut current = self.config.write().await;
        *current = config;
        info!(instance = %self.instance_id, "watch configuration updated");
        Ok(())
    }

    /// Runs the coordinator until shutdown: state changes refresh liveness,
    /// each tick re-evaluates the watched set.
    pub async fn run(self: Arc<Self>, mut feed: broadcast::Receiver<StateChange>) {
        info!(instance = %self.instance_id, "starting watchdog coordinator");
        let mut tick = tokio::time::interval(EVALUATION_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *self.is_shutdown.read().await {
                info!(instance = %self.instance_id, "watchdog coordinator stopped");
                break;
            }

            tokio::select! {
                _ = tick.tick() => {
                    self.evaluate_once(Utc::now()).await;
                }
                change = feed.recv() => match change {
                    Ok(change) => self.handle_state_change(&change).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Bursts self-correct: the next good value overwrites last_ok.
                        warn!(instance = %self.instance_id, skipped, "state feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // The registry owning the feed is gone; nothing left to watch.
                        warn!(instance = %self.instance_id, "state feed closed, stopping coordinator");
                        break;
                    }
                },
            }
        }
    }

    pub async fn shutdown(&self) {
        let mut is_shutdown = self.is_shutdown.write().await;
        *is_shutdown = true;
    }

    /// Feed handler: any good value from a source bound to a watched device
    /// refreshes that device's last-known-good timestamp.
    pub async fn handle_state_change(&self, change: &StateChange) {
        if !is_good_value(&change.value) {
            return;
        }
        let Some(device_id) = self.catalog.device_of(&change.source_id).await else {
            return;
        };
        if !self.config.read().await.is_watched(&device_id) {
            return;
        }
        debug!(device_id = %device_id, source_id = %change.source_id, "good signal observed");
        self.liveness.record_good(&device_id, change.timestamp).await;
    }

    /// One evaluation cycle: a fresh verdict for every watched device, an
    /// atomic snapshot swap, and edge-triggered notifications. `now` is
    /// explicit so tests can drive synthetic time.
    #[instrument(skip(self, now), fields(instance = %self.instance_id))]
    pub async fn evaluate_once(&self, now: DateTime<Utc>) -> Arc<HashMap<String, DeviceHealth>> {
        let config = self.config.read().await.clone();
        let policy = TierPolicy::from_config(&config);
        let watched = policy.watched();

        let mut verdicts = HashMap::with_capacity(watched.len());
        for device_id in watched {
            let Some(tier) = policy.tier_of(&device_id) else {
                continue;
            };
            let verdict = self
                .evaluate_device(&device_id, tier, policy.timeout_of(tier), now)
                .await;
            verdicts.insert(device_id, verdict);
        }

        let watched_set: HashSet<String> = verdicts.keys().cloned().collect();
        self.liveness.retain_watched(&watched_set).await;

        // Edge detection: mutate the previous-verdict map fully before any
        // notification await point, so no half-updated state is ever visible.
        let transitions: Vec<DeviceHealth> = {
            let mut prev_down = self.prev_down.write().await;
            prev_down.retain(|device_id, _| watched_set.contains(device_id));
            verdicts
                .values()
                .filter(|verdict| {
                    let was_down = prev_down
                        .insert(verdict.device_id.clone(), verdict.down)
                        .unwrap_or(false);
                    was_down != verdict.down
                })
                .cloned()
                .collect()
        };

        let published = Arc::new(verdicts);
        {
            let mut snapshot = self.snapshot.write().await;
            *snapshot = published.clone();
        }

        for verdict in &transitions {
            self.notify_transition(verdict, &config).await;
        }

        debug!(
            devices = published.len(),
            transitions = transitions.len(),
            "evaluation cycle complete"
        );
        published
    }

    async fn evaluate_device(
        &self,
        device_id: &str,
        tier: Tier,
        timeout: chrono::Duration,
        now: DateTime<Utc>,
    ) -> DeviceHealth {
        self.liveness.ensure_initialized(device_id, now).await;
        let sources = self.catalog.signal_sources(device_id).await;

        let (down, reason) = if sources.is_empty() {
            // Nothing can ever self-report good; only elapsed time applies.
            let last_ok = self.liveness.last_ok(device_id).await.unwrap_or(now);
            if now - last_ok > timeout {
                (true, HealthReason::NoEntitiesTimeout)
            } else {
                (false, HealthReason::NoEntitiesWaiting)
            }
        } else {
            let mut any_good = false;
            for source_id in &sources {
                match self.catalog.current_value(source_id).await {
                    Some(value) if is_good_value(&value) => {
                        any_good = true;
                        break;
                    }
                    // Absent or bad values are simply not good, never an error.
                    _ => {}
                }
            }

            if any_good {
                // Safety net for missed feed events: a device observed good
                // this cycle must never be computed as down.
                self.liveness.record_good(device_id, now).await;
                (false, HealthReason::Ok)
            } else {
                let last_ok = self.liveness.last_ok(device_id).await.unwrap_or(now);
                if now - last_ok > timeout {
                    (true, HealthReason::Timeout)
                } else {
                    (false, HealthReason::Waiting)
                }
            }
        };

        let device_name = self
            .catalog
            .display_name(device_id)
            .await
            .unwrap_or_else(|| device_id.to_string());

        DeviceHealth {
            device_id: device_id.to_string(),
            device_name,
            tier,
            down,
            reason,
            last_ok: self.liveness.last_ok(device_id).await,
            timeout_minutes: timeout.num_minutes(),
        }
    }

    /// Drives the alert lifecycle on a verdict edge. The three effects —
    /// alert board, outbound forward, domain event — are independent and
    /// best-effort; none may block the cycle or suppress the others.
    async fn notify_transition(&self, verdict: &DeviceHealth, config: &WatchConfig) {
        let notification_id = self.notification_id(&verdict.device_id);
        let target = NotifyTarget::parse(&config.notify_target);

        if verdict.down {
            let message = format!(
                "Device **{}** is no longer responding (tier: {}, reason: {}, timeout: {} min)",
                verdict.device_name, verdict.tier, verdict.reason, verdict.timeout_minutes
            );
            self.alerts.create(&notification_id, ALERT_TITLE, &message).await;

            if let Some(target) = &target {
                if let Err(e) = self.messenger.send(target, ALERT_TITLE, &message).await {
                    warn!(device_id = %verdict.device_id, error = %e, "down notification delivery failed");
                }
            }

            let _ = self.events.send(WatchEvent::DeviceDown {
                device_id: verdict.device_id.clone(),
                device_name: verdict.device_name.clone(),
                tier: verdict.tier,
                reason: verdict.reason,
                timeout_minutes: verdict.timeout_minutes,
            });

            warn!(
                device_id = %verdict.device_id,
                tier = %verdict.tier,
                reason = %verdict.reason,
                "device went down"
            );
        } else {
            self.alerts.dismiss(&notification_id).await;

            if config.notify_recovered {
                if let Some(target) = &target {
                    let message = format!("Device **{}** is reachable again.", verdict.device_name);
                    if let Err(e) = self.messenger.send(target, ALERT_TITLE, &message).await {
                        warn!(device_id = %verdict.device_id, error = %e, "recovery notification delivery failed");
                    }
                }
            }

            let _ = self.events.send(WatchEvent::DeviceRecovered {
                device_id: verdict.device_id.clone(),
                device_name: verdict.device_name.clone(),
            });

            info!(device_id = %verdict.device_id, "device recovered");
        }
    }

    fn notification_id(&self, device_id: &str) -> String {
        format!("watchdog_{}_{}", self.instance_id, device_id)
    }

    /// Latest published verdict map; always a complete, consistent cycle.
    pub async fn snapshot(&self) -> Arc<HashMap<String, DeviceHealth>> {
        self.snapshot.read().await.clone()
    }

    pub async fn summary(&self) -> WatchSummary {
        let snapshot = self.snapshot().await;
        let mut down_devices: Vec<String> = snapshot
            .values()
            .filter(|v| v.down)
            .map(|v| v.device_id.clone())
            .collect();
        down_devices.sort();

        WatchSummary {
            watched: snapshot.len(),
            down_count: down_devices.len(),
            down_devices,
            timestamp: Utc::now(),
        }
    }
}
