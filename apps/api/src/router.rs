use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};

use catalog_cell::{create_catalog_router, DeviceRegistry};
use watchdog_cell::{create_watchdog_router, WatchdogCoordinator};

pub fn create_router(
    registry: Arc<DeviceRegistry>,
    coordinator: Arc<WatchdogCoordinator>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Device Watch API is running!" }))
        .nest("/catalog", create_catalog_router(registry))
        .nest("/watchdog", create_watchdog_router(coordinator))
}
