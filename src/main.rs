// Main entry point - Dependency injection and session startup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::chart_service::ChartService;
use crate::application::ingest_service::IngestService;
use crate::application::session_service::SessionService;
use crate::domain::chart::Projector;
use crate::infrastructure::config::{load_chart_config, load_cloud_config};
use crate::infrastructure::particle_cloud::ParticleCloud;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_chart, health_check, list_ranges, stream_chart};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let cloud_config = load_cloud_config()?;
    let chart_config = load_chart_config()?;

    // Create transport and ingest buffer (infrastructure layer)
    let cloud = Arc::new(ParticleCloud::new(cloud_config.cloud.api_url.clone()));
    let ingest = Arc::new(IngestService::new());

    // Login and subscribe once; any failure here is terminal for the
    // session and the chart surface never comes up.
    let session = SessionService::new(
        cloud,
        ingest.clone(),
        Duration::from_secs(cloud_config.cloud.login_timeout_secs),
    );
    session
        .connect(
            &cloud_config.cloud.username,
            &cloud_config.cloud.password,
            &cloud_config.cloud.device_name,
            &cloud_config.cloud.event_prefix,
        )
        .await
        .context("unable to start weight event session")?;

    // Create chart service (application layer)
    let projector = Projector::new(chart_config.calibration, chart_config.order_policy);
    let chart_service = ChartService::new(
        ingest,
        projector,
        Duration::from_secs(chart_config.tick_secs),
    );

    // Create application state
    let state = Arc::new(AppState { chart_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/ranges", get(list_ranges))
        .route("/chart/:range", get(get_chart))
        .route("/chart/:range/stream", get(stream_chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting perch-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Stop the event feed before exiting
    session.shutdown();

    Ok(())
}
