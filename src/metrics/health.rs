//! Health check endpoints and Prometheus metrics server
//!
//! This module provides HTTP endpoints for health checks, Prometheus metrics
//! and a JSON view of the rotation state using Axum.

use crate::config::SessionConfig;
use crate::metrics::collector::MetricsCollector;
use crate::types::LobbySnapshot;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health server configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    /// Port to bind the health server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HealthServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for the health server
#[derive(Clone)]
pub struct HealthServerState {
    pub metrics_collector: Arc<MetricsCollector>,
    pub snapshot: watch::Receiver<LobbySnapshot>,
    pub connected: Arc<AtomicBool>,
    pub session: SessionConfig,
    pub started_at: DateTime<Utc>,
}

impl HealthServerState {
    fn status(&self) -> HealthStatus {
        if self.connected.load(Ordering::Relaxed) {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

/// Health server that provides HTTP endpoints for monitoring
pub struct HealthServer {
    config: HealthServerConfig,
    state: HealthServerState,
    shutdown_tx: broadcast::Sender<()>,
}

impl HealthServer {
    /// Create a new health server
    pub fn new(config: HealthServerConfig, state: HealthServerState) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state,
            shutdown_tx,
        }
    }

    /// Start the health server
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid health server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!("Health server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Health server shutdown signal received");
            })
            .await?;

        info!("Health server stopped");
        Ok(())
    }

    /// Create the Axum router with all health endpoints
    fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/stats", get(stats_handler))
            .with_state(self.state.clone())
    }

    /// Stop the health server
    pub fn stop(&self) {
        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to health server: {}", e);
        }
    }
}

/// Root endpoint handler - shows service information
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "osu-autohost",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/health", "/metrics", "/stats"]
    }))
}

async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    let status = state.status();
    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": "osu-autohost",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<HealthServerState>) -> Response {
    state.metrics_collector.update_uptime();

    match encode_metrics(&state.metrics_collector) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Rotation state for humans and dashboards
async fn stats_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    let snapshot = state.snapshot.borrow().clone();
    let uptime = Utc::now() - state.started_at;

    Json(json!({
        "service": {
            "name": "osu-autohost",
            "version": env!("CARGO_PKG_VERSION"),
            "status": state.status(),
            "started_at": state.started_at,
            "uptime_seconds": uptime.num_seconds()
        },
        "room": {
            "id": state.session.room_id,
            "name": state.session.display_name(),
            "link": state.session.multiplayer_link(),
            "min_stars": state.session.min_stars,
            "max_stars": state.session.max_stars
        },
        "rotation": snapshot,
        "timestamp": Utc::now()
    }))
}

/// Encode the registry in the Prometheus text format
pub fn encode_metrics(metrics_collector: &MetricsCollector) -> Result<String> {
    let metric_families = metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}
