// =====================================================================================
// WATCHDOG ROUTER TESTS
// =====================================================================================

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use tower::ServiceExt;

use catalog_cell::{DeviceRecord, DeviceRegistry};
use notify_cell::{AlertBoard, LogMessenger};
use shared_config::{TimeoutSettings, WatchConfig};
use watchdog_cell::{create_watchdog_router, WatchdogCoordinator};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

async fn setup() -> (Arc<WatchdogCoordinator>, axum::Router) {
    let registry = Arc::new(DeviceRegistry::new());
    registry
        .register_device(DeviceRecord {
            device_id: "hub_1".to_string(),
            name: Some("Living Room Hub".to_string()),
            signal_sources: vec![],
        })
        .await
        .unwrap();

    let config = WatchConfig {
        critical_devices: vec!["hub_1".to_string()],
        timeouts: TimeoutSettings::Configured {
            critical_minutes: 1,
            normal_minutes: 60,
            slow_minutes: 1440,
        },
        ..WatchConfig::default()
    };
    let coordinator = Arc::new(WatchdogCoordinator::new(
        "test",
        config,
        registry,
        Arc::new(AlertBoard::new()),
        Arc::new(LogMessenger),
    ));
    let app = create_watchdog_router(coordinator.clone());
    (coordinator, app)
}

#[tokio::test]
async fn test_devices_endpoint_returns_snapshot_and_summary() {
    let (coordinator, app) = setup().await;
    coordinator.evaluate_once(ts(0)).await;

    let request = Request::builder()
        .method("GET")
        .uri("/devices")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["devices"]["hub_1"]["device_name"], "Living Room Hub");
    assert_eq!(json["devices"]["hub_1"]["tier"], "critical");
    assert_eq!(json["devices"]["hub_1"]["down"], false);
    assert_eq!(json["devices"]["hub_1"]["reason"], "no_entities_waiting");
    assert_eq!(json["summary"]["watched"], 1);
    assert_eq!(json["summary"]["down_count"], 0);
}

#[tokio::test]
async fn test_single_device_endpoint() {
    let (coordinator, app) = setup().await;
    coordinator.evaluate_once(ts(0)).await;

    let request = Request::builder()
        .method("GET")
        .uri("/devices/hub_1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("GET")
        .uri("/devices/unknown")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_down_devices_and_alerts_endpoints() {
    let (coordinator, app) = setup().await;
    coordinator.evaluate_once(ts(0)).await;
    coordinator.evaluate_once(ts(61)).await;

    let request = Request::builder()
        .method("GET")
        .uri("/devices/down")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["device_id"], "hub_1");
    assert_eq!(json[0]["reason"], "no_entities_timeout");

    let request = Request::builder()
        .method("GET")
        .uri("/alerts")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], "watchdog_test_hub_1");
}

#[tokio::test]
async fn test_summary_endpoint() {
    let (coordinator, app) = setup().await;
    coordinator.evaluate_once(ts(0)).await;

    let request = Request::builder()
        .method("GET")
        .uri("/summary")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["watched"], 1);
    assert!(json.get("down_devices").is_some());
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_config_roundtrip() {
    let (_coordinator, app) = setup().await;

    let request = Request::builder()
        .method("GET")
        .uri("/config")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["critical_devices"][0], "hub_1");

    let request = Request::builder()
        .method("PUT")
        .uri("/config")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "critical_devices": ["hub_1", "hub_2"],
                "timeouts": { "mode": "fixed" },
                "notify_target": "telegram.ops",
                "notify_recovered": false
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = Request::builder()
        .method("GET")
        .uri("/config")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["critical_devices"].as_array().unwrap().len(), 2);
    assert_eq!(json["notify_recovered"], false);
}

#[tokio::test]
async fn test_config_update_rejects_out_of_range_timeout() {
    let (_coordinator, app) = setup().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/config")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "critical_devices": ["hub_1"],
                "timeouts": {
                    "mode": "configured",
                    "critical_minutes": 0,
                    "normal_minutes": 60,
                    "slow_minutes": 1440
                }
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("allowed range"));
}
