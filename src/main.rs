// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::alarm_service::AlarmService;
use crate::application::feed_service::AlarmFeedService;
use crate::infrastructure::config::{load_service_config, load_threshold_table};
use crate::infrastructure::http_repository::HttpAlarmRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    acknowledge_alarm, alarm_feed, alarm_overview, classify_value, device_aggregates,
    device_severity, health_check, list_alarms, sections, thresholds, top_devices,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_service_config().context("Failed to load service configuration")?;
    let threshold_table = load_threshold_table(config.thresholds.path.as_deref())?;
    tracing::info!(
        source = ?config.thresholds.path,
        "Loaded alarm thresholds"
    );

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpAlarmRepository::new(&config.backend)?);

    // Create services (application layer)
    let alarm_service = AlarmService::new(
        repository,
        Arc::new(threshold_table),
        config.backend.alarm_limit,
    );
    let feed_service = AlarmFeedService::new(alarm_service.clone(), config.refresh.interval());

    // Create application state
    let state = Arc::new(AppState {
        alarm_service,
        feed_service,
        default_top_n: config.refresh.top_n,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/thresholds", get(thresholds))
        .route("/classify", get(classify_value))
        .route("/alarms", get(list_alarms))
        .route("/alarms/overview", get(alarm_overview))
        .route("/alarms/devices", get(device_aggregates))
        .route("/alarms/top", get(top_devices))
        .route("/alarms/sections", get(sections))
        .route("/alarms/feed", get(alarm_feed))
        .route("/alarms/:id/acknowledge", put(acknowledge_alarm))
        .route("/devices/:id/severity", get(device_severity))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!(
        addr = %config.server.bind_addr,
        backend = %config.backend.base_url,
        "Starting pipeline-alarms service"
    );

    axum::serve(listener, router).await?;

    Ok(())
}
