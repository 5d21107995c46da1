// =====================================================================================
// CATALOG CELL HANDLERS
// =====================================================================================

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use crate::models::{CatalogError, CatalogSnapshot, DeviceRecord, SetValueRequest, StateChange};
use crate::registry::DeviceRegistry;

#[instrument(skip(registry))]
pub async fn register_device(
    State(registry): State<Arc<DeviceRegistry>>,
    Json(record): Json<DeviceRecord>,
) -> Result<StatusCode, CatalogError> {
    registry.register_device(record).await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(registry))]
pub async fn set_value(
    State(registry): State<Arc<DeviceRegistry>>,
    Json(request): Json<SetValueRequest>,
) -> Result<Json<StateChange>, CatalogError> {
    let change = registry.set_value(&request.source_id, &request.value).await?;
    Ok(Json(change))
}

#[instrument(skip(registry))]
pub async fn get_catalog(
    State(registry): State<Arc<DeviceRegistry>>,
) -> Json<CatalogSnapshot> {
    Json(registry.snapshot().await)
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            CatalogError::DeviceExists(_) => StatusCode::CONFLICT,
            CatalogError::DeviceNotFound(_) | CatalogError::SourceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
        };

        (status, Json(serde_json::json!({
            "error": self.to_string(),
            "timestamp": chrono::Utc::now()
        }))).into_response()
    }
}
