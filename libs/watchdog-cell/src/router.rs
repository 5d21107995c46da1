use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{
    get_active_alerts, get_config, get_device, get_devices, get_down_devices, get_summary,
    update_config,
};
use crate::services::coordinator::WatchdogCoordinator;

pub fn create_watchdog_router(coordinator: Arc<WatchdogCoordinator>) -> Router {
    Router::new()
        .route("/devices", get(get_devices))
        .route("/devices/down", get(get_down_devices))
        .route("/devices/{device_id}", get(get_device))
        .route("/summary", get(get_summary))
        .route("/alerts", get(get_active_alerts))
        .route("/config", get(get_config).put(update_config))
        .layer(CorsLayer::permissive())
        .with_state(coordinator)
}
