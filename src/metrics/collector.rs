//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the autohost bot using
//! Prometheus metrics.

use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use std::time::Instant;

/// Main metrics collector for the autohost bot
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Lobby event metrics
    event_metrics: EventMetrics,

    /// Host rotation metrics
    rotation_metrics: RotationMetrics,

    /// Difficulty enforcement metrics
    gate_metrics: GateMetrics,

    started_at: Instant,
}

/// Lobby event metrics
#[derive(Clone)]
pub struct EventMetrics {
    /// Events received from the protocol client, by kind
    pub events_total: IntCounterVec,

    /// Lobby commands that failed, by command
    pub command_failures_total: IntCounterVec,

    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,
}

/// Host rotation metrics
#[derive(Clone)]
pub struct RotationMetrics {
    /// Host handovers issued by the bot
    pub rotations_total: IntCounter,

    /// Players waiting for host
    pub queue_length: IntGauge,

    /// Players who hosted during the current cycle
    pub already_hosted: IntGauge,
}

/// Difficulty enforcement metrics
#[derive(Clone)]
pub struct GateMetrics {
    /// Warnings sent, by bound ("min", "max", "final")
    pub warnings_total: IntCounterVec,

    /// Matches aborted for being out of band
    pub aborts_total: IntCounter,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let event_metrics = EventMetrics::new(&registry)?;
        let rotation_metrics = RotationMetrics::new(&registry)?;
        let gate_metrics = GateMetrics::new(&registry)?;

        Ok(Self {
            registry,
            event_metrics,
            rotation_metrics,
            gate_metrics,
            started_at: Instant::now(),
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn events(&self) -> &EventMetrics {
        &self.event_metrics
    }

    pub fn rotation(&self) -> &RotationMetrics {
        &self.rotation_metrics
    }

    pub fn gate(&self) -> &GateMetrics {
        &self.gate_metrics
    }

    pub fn record_event(&self, kind: &str) {
        self.event_metrics
            .events_total
            .with_label_values(&[kind])
            .inc();
    }

    pub fn record_command_failure(&self, command: &str) {
        self.event_metrics
            .command_failures_total
            .with_label_values(&[command])
            .inc();
    }

    pub fn record_rotation(&self) {
        self.rotation_metrics.rotations_total.inc();
    }

    /// Update queue gauges after the queue changed
    pub fn update_queue(&self, upcoming: usize, already_hosted: usize) {
        self.rotation_metrics.queue_length.set(upcoming as i64);
        self.rotation_metrics
            .already_hosted
            .set(already_hosted as i64);
    }

    pub fn record_warning(&self, bound: &str) {
        self.gate_metrics
            .warnings_total
            .with_label_values(&[bound])
            .inc();
    }

    pub fn record_abort(&self) {
        self.gate_metrics.aborts_total.inc();
    }

    /// Refresh the uptime gauge; called before every scrape
    pub fn update_uptime(&self) {
        self.event_metrics
            .uptime_seconds
            .set(self.started_at.elapsed().as_secs() as i64);
    }
}

impl EventMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let events_total = IntCounterVec::new(
            Opts::new(
                "osu_autohost_events_total",
                "Lobby events received from the server",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(events_total.clone()))?;

        let command_failures_total = IntCounterVec::new(
            Opts::new(
                "osu_autohost_command_failures_total",
                "Lobby commands that could not be delivered",
            ),
            &["command"],
        )?;
        registry.register(Box::new(command_failures_total.clone()))?;

        let uptime_seconds = IntGauge::new("osu_autohost_uptime_seconds", "Bot uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        Ok(Self {
            events_total,
            command_failures_total,
            uptime_seconds,
        })
    }
}

impl RotationMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rotations_total = IntCounter::new(
            "osu_autohost_rotations_total",
            "Host handovers issued by the bot",
        )?;
        registry.register(Box::new(rotations_total.clone()))?;

        let queue_length = IntGauge::new(
            "osu_autohost_queue_length",
            "Players waiting for their turn as host",
        )?;
        registry.register(Box::new(queue_length.clone()))?;

        let already_hosted = IntGauge::new(
            "osu_autohost_already_hosted",
            "Players who hosted during the current cycle",
        )?;
        registry.register(Box::new(already_hosted.clone()))?;

        Ok(Self {
            rotations_total,
            queue_length,
            already_hosted,
        })
    }
}

impl GateMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let warnings_total = IntCounterVec::new(
            Opts::new(
                "osu_autohost_difficulty_warnings_total",
                "Warnings sent for out-of-band beatmaps",
            ),
            &["bound"],
        )?;
        registry.register(Box::new(warnings_total.clone()))?;

        let aborts_total = IntCounter::new(
            "osu_autohost_matches_aborted_total",
            "Matches aborted for an out-of-band beatmap",
        )?;
        registry.register(Box::new(aborts_total.clone()))?;

        Ok(Self {
            warnings_total,
            aborts_total,
        })
    }
}
