// =====================================================================================
// ALERT BOARD SERVICE
// =====================================================================================

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::ActiveAlert;

/// In-app persistent alert store. An alert exists while its subject is down
/// and is absent once dismissed; creating under an existing id updates the
/// message rather than stacking a duplicate.
pub struct AlertBoard {
    active: RwLock<HashMap<String, ActiveAlert>>,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self, id: &str, title: &str, message: &str) {
        let mut active = self.active.write().await;
        match active.get_mut(id) {
            Some(existing) => {
                existing.title = title.to_string();
                existing.message = message.to_string();
            }
            None => {
                debug!(alert_id = %id, "creating alert");
                active.insert(
                    id.to_string(),
                    ActiveAlert {
                        id: id.to_string(),
                        title: title.to_string(),
                        message: message.to_string(),
                        created_at: Utc::now(),
                    },
                );
            }
        }
    }

    /// Removes the alert if present; dismissing an absent id is a no-op.
    pub async fn dismiss(&self, id: &str) -> bool {
        let mut active = self.active.write().await;
        active.remove(id).is_some()
    }

    pub async fn is_active(&self, id: &str) -> bool {
        let active = self.active.read().await;
        active.contains_key(id)
    }

    pub async fn active(&self) -> Vec<ActiveAlert> {
        let active = self.active.read().await;
        let mut alerts: Vec<ActiveAlert> = active.values().cloned().collect();
        alerts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        alerts
    }

    pub async fn count(&self) -> usize {
        let active = self.active.read().await;
        active.len()
    }
}

impl Default for AlertBoard {
    fn default() -> Self {
        Self::new()
    }
}
