//! Metrics and monitoring for the autohost bot
//!
//! This module provides Prometheus metrics collection and the optional HTTP
//! server exposing health, metrics and rotation state.

pub mod collector;
pub mod health;

pub use collector::{EventMetrics, GateMetrics, MetricsCollector, RotationMetrics};
pub use health::{HealthServer, HealthServerConfig, HealthServerState, HealthStatus};
