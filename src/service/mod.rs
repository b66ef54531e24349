//! Service orchestration for the autohost bot
//!
//! This module contains the service that runs the bot against a live
//! Bancho connection, plus the startup and event loop building blocks.

pub mod app;

pub use app::{prepare_lobby, run_event_loop, AutohostService, StopReason};
