use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{get_catalog, register_device, set_value};
use crate::registry::DeviceRegistry;

pub fn create_catalog_router(registry: Arc<DeviceRegistry>) -> Router {
    Router::new()
        .route("/devices", get(get_catalog).post(register_device))
        .route("/states", post(set_value))
        .layer(CorsLayer::permissive())
        .with_state(registry)
}
