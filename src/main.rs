use axum::{Router, http::header, routing::get};
use fintrack::{
    ConversationService, FinanceError, FinanceService, NotificationService, Scheduler,
    api::{ApiDoc, AppState, api_routes},
    config::CONFIG,
    core::clock::{Clock, SystemClock},
    infrastructure::{
        delivery::{Delivery, telegram::TelegramDelivery},
        logging::in_memory::InMemoryLogging,
        sessions::in_memory::InMemorySessionStore,
        storage::in_memory::InMemoryStorage,
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!(config = ?*CONFIG, "Loaded configuration");

    let bot_token = CONFIG
        .telegram_bot_token
        .clone()
        .ok_or_else(|| FinanceError::ConfigError("TELEGRAM_BOT_TOKEN is not set".to_string()))?;

    // Initialize storage, logging and delivery
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let finance = Arc::new(FinanceService::new(
        InMemoryStorage::new(),
        InMemoryLogging::new(),
        clock.clone(),
    ));
    let delivery: Arc<dyn Delivery> = Arc::new(TelegramDelivery::new(CONFIG.telegram_api_url.clone(), bot_token));
    let conversations = Arc::new(ConversationService::new(
        finance.clone(),
        InMemorySessionStore::new(),
        delivery.clone(),
    ));
    let notifications = Arc::new(NotificationService::new(
        finance.clone(),
        delivery,
        CONFIG.notification_settings(),
    ));

    let mut scheduler = Scheduler::new(notifications.clone(), clock, CONFIG.schedule().jobs());
    scheduler.start();

    let state = AppState {
        finance,
        conversations,
        notifications,
    };

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http()); // Request tracing

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    info!("Scheduler stopped");
    Ok(())
}
