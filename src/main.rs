// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::aggregator::RollingAggregator;
use crate::application::auth_service::AuthService;
use crate::application::monitor_service::MonitorService;
use crate::application::random_source::SeededRandom;
use crate::application::sample_generator::SampleGenerator;
use crate::application::sampling_loop::SamplingLoop;
use crate::application::scheduler::TokioScheduler;
use crate::application::settings_service::SettingsService;
use crate::infrastructure::config::load_monitor_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_report_row, alerts, export_reports_csv, get_settings, health_check, list_views,
    live_dashboard, login, reports, root_redirect, save_settings, stream_live,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_monitor_config()?;
    let settings = config.initial_settings()?;

    // Create generator and history (domain + application layer)
    let generator = SampleGenerator::new(
        Box::new(SeededRandom::new(config.sampling.seed)),
        config.generator_profile(),
        config.theft_rule(),
    );
    let aggregator = RollingAggregator::new(config.history.live_capacity, config.history.report_capacity);
    let monitor = Arc::new(MonitorService::new(generator, aggregator, settings));
    monitor.seed_reports(config.sampling.seed_rows, config.seed_spacing()?, chrono::Utc::now());

    // Start the sampling timer
    let sampling = Arc::new(SamplingLoop::new(monitor.clone(), Arc::new(TokioScheduler)));
    sampling.start(settings.sampling_interval());

    // Create application state
    let state = Arc::new(AppState {
        monitor: monitor.clone(),
        settings_service: SettingsService::new(monitor, sampling.clone()),
        auth_service: AuthService::new(config.auth.email.clone(), config.auth.password.clone()),
        alert_limit: config.alerts.limit,
    });

    // Build router (presentation layer)
    // Note: JSON bodies are compressed in our response builders,
    // so we don't use CompressionLayer to avoid double compression
    let router = Router::new()
        .route("/", get(root_redirect))
        .route("/healthz", get(health_check))
        .route("/views", get(list_views))
        .route("/login", post(login))
        .route("/dashboard", get(live_dashboard))
        .route("/reports", get(reports))
        .route("/reports/rows", post(add_report_row))
        .route("/reports/export.csv", get(export_reports_csv))
        .route("/alerts", get(alerts))
        .route("/settings", get(get_settings).put(save_settings))
        .route("/live", get(stream_live))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind '{}'", config.server.bind))?;
    tracing::info!("Starting power-theft-monitor on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    sampling.stop();
    Ok(())
}
