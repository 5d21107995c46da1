use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod router;

use catalog_cell::DeviceRegistry;
use notify_cell::{AlertBoard, LogMessenger, Messenger, WebhookMessenger};
use shared_config::AppConfig;
use watchdog_cell::WatchdogCoordinator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Device Watch API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Catalog and its state change feed
    let registry = Arc::new(DeviceRegistry::new());
    let feed = registry.subscribe();

    // Outbound channel: webhook when configured, log-only otherwise
    let messenger: Arc<dyn Messenger> = if config.notify_webhook_url.is_empty() {
        Arc::new(LogMessenger)
    } else {
        Arc::new(WebhookMessenger::new(&config.notify_webhook_url))
    };

    // One coordinator instance per process; its id keys the alert board
    let coordinator = Arc::new(WatchdogCoordinator::new(
        Uuid::new_v4().to_string(),
        config.watch.clone(),
        registry.clone(),
        Arc::new(AlertBoard::new()),
        messenger,
    ));

    tokio::spawn(coordinator.clone().run(feed));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(registry, coordinator)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
