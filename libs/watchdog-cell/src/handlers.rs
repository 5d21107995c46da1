// =====================================================================================
// WATCHDOG CELL HANDLERS
// =====================================================================================

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use crate::error::WatchdogError;
use crate::models::{DeviceHealth, DevicesResponse, WatchSummary};
use crate::services::coordinator::WatchdogCoordinator;
use notify_cell::ActiveAlert;
use shared_config::WatchConfig;

#[instrument(skip(coordinator))]
pub async fn get_devices(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
) -> Json<DevicesResponse> {
    let snapshot = coordinator.snapshot().await;
    let summary = coordinator.summary().await;
    Json(DevicesResponse {
        devices: (*snapshot).clone(),
        summary,
    })
}

#[instrument(skip(coordinator))]
pub async fn get_device(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceHealth>, WatchdogError> {
    let snapshot = coordinator.snapshot().await;
    snapshot
        .get(&device_id)
        .cloned()
        .map(Json)
        .ok_or(WatchdogError::DeviceNotWatched(device_id))
}

#[instrument(skip(coordinator))]
pub async fn get_down_devices(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
) -> Json<Vec<DeviceHealth>> {
    let snapshot = coordinator.snapshot().await;
    let mut down: Vec<DeviceHealth> = snapshot.values().filter(|v| v.down).cloned().collect();
    down.sort_by(|a, b| a.device_id.cmp(&b.device_id));
    Json(down)
}

#[instrument(skip(coordinator))]
pub async fn get_summary(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
) -> Json<WatchSummary> {
    Json(coordinator.summary().await)
}

#[instrument(skip(coordinator))]
pub async fn get_active_alerts(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
) -> Json<Vec<ActiveAlert>> {
    Json(coordinator.alert_board().active().await)
}

#[instrument(skip(coordinator))]
pub async fn get_config(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
) -> Json<WatchConfig> {
    Json(coordinator.config().await)
}

#[instrument(skip(coordinator, config))]
pub async fn update_config(
    State(coordinator): State<Arc<WatchdogCoordinator>>,
    Json(config): Json<WatchConfig>,
) -> Result<StatusCode, WatchdogError> {
    coordinator.update_config(config).await?;
    Ok(StatusCode::NO_CONTENT)
}

impl IntoResponse for WatchdogError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            WatchdogError::DeviceNotWatched(_) => StatusCode::NOT_FOUND,
            WatchdogError::InvalidConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        (status, Json(serde_json::json!({
            "error": self.to_string(),
            "timestamp": chrono::Utc::now()
        }))).into_response()
    }
}
