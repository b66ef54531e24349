//! Host rotation for a single multiplayer room
//!
//! This module holds the rotation queue, the star rating gate and the
//! controller that wires both to lobby events.

pub mod client;
pub mod controller;
pub mod gate;
pub mod queue;

// Re-export commonly used types
pub use client::LobbyClient;
pub use controller::{EventOutcome, LobbyController};
pub use gate::DifficultyGate;
pub use queue::HostQueue;
