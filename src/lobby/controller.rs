//! Lobby controller
//!
//! Owns the host queue, the current host and the last selected beatmap, and
//! reacts to lobby events one at a time. Every command sent back through the
//! [`LobbyClient`] is fire-and-forget: failures are logged and counted, never
//! retried.

use crate::error::Result;
use crate::lobby::client::LobbyClient;
use crate::lobby::gate::DifficultyGate;
use crate::lobby::queue::HostQueue;
use crate::metrics::MetricsCollector;
use crate::types::{Beatmap, LobbyEvent, LobbySnapshot, PlayerName, PlayerScore};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What the event loop should do after an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    /// The room is gone; stop processing
    Closed,
}

/// Host rotation and difficulty enforcement for a single room
pub struct LobbyController {
    client: Arc<dyn LobbyClient>,
    gate: DifficultyGate,
    queue: HostQueue,
    current_host: Option<PlayerName>,
    current_beatmap: Option<Beatmap>,
    metrics: Arc<MetricsCollector>,
    snapshot_tx: watch::Sender<LobbySnapshot>,
    events_handled: u64,
}

impl LobbyController {
    /// Create a controller with its own metrics registry
    pub fn new(client: Arc<dyn LobbyClient>, gate: DifficultyGate) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        Ok(Self::with_metrics(client, gate, metrics))
    }

    pub fn with_metrics(
        client: Arc<dyn LobbyClient>,
        gate: DifficultyGate,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(LobbySnapshot::default());

        Self {
            client,
            gate,
            queue: HostQueue::new(),
            current_host: None,
            current_beatmap: None,
            metrics,
            snapshot_tx,
            events_handled: 0,
        }
    }

    /// Receive a fresh [`LobbySnapshot`] after every handled event
    pub fn subscribe(&self) -> watch::Receiver<LobbySnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn gate(&self) -> &DifficultyGate {
        &self.gate
    }

    pub fn queue(&self) -> &HostQueue {
        &self.queue
    }

    pub fn current_host(&self) -> Option<&str> {
        self.current_host.as_deref()
    }

    pub fn current_beatmap(&self) -> Option<&Beatmap> {
        self.current_beatmap.as_ref()
    }

    /// Put the bot itself in line when nobody is queued yet
    pub fn seed_host(&mut self, own_name: &str) {
        if self.queue.is_empty() {
            debug!("Seeding host queue with {}", own_name);
            self.queue.enqueue(own_name);
            self.publish_snapshot();
        }
    }

    /// Dispatch a single event to its handler
    pub async fn handle_event(&mut self, event: LobbyEvent) -> EventOutcome {
        self.metrics.record_event(event.kind());
        self.events_handled += 1;
        debug!("Handling lobby event: {}", event.kind());

        let outcome = match event {
            LobbyEvent::PlayerJoined { player, is_self } => {
                self.on_player_joined(player, is_self).await;
                EventOutcome::Continue
            }
            LobbyEvent::PlayerLeft { player } => {
                self.on_player_left(&player).await;
                EventOutcome::Continue
            }
            LobbyEvent::MatchFinished { scores } => {
                self.on_match_finished(&scores).await;
                EventOutcome::Continue
            }
            LobbyEvent::BeatmapSelected { beatmap } => {
                self.on_beatmap_selected(beatmap).await;
                EventOutcome::Continue
            }
            LobbyEvent::MatchStarted => {
                self.on_match_started().await;
                EventOutcome::Continue
            }
            LobbyEvent::HostChanged { player } => {
                self.on_host_changed(player);
                EventOutcome::Continue
            }
            LobbyEvent::MatchClosed => {
                info!("Room was closed");
                EventOutcome::Closed
            }
            LobbyEvent::TransportError { message } => {
                warn!("Transport error: {}", message);
                EventOutcome::Continue
            }
        };

        self.publish_snapshot();
        outcome
    }

    async fn on_player_joined(&mut self, player: PlayerName, is_self: bool) {
        info!("{} joined the room", player);

        if is_self {
            let result = self.client.set_host(&player).await;
            self.check("set_host", result);
            self.current_host = Some(player.clone());
        }

        self.queue.enqueue(&player);
        self.announce_next_hosts().await;
    }

    async fn on_player_left(&mut self, player: &str) {
        info!("{} left the room", player);

        self.queue.remove(player);
        self.announce_next_hosts().await;
    }

    async fn on_match_finished(&mut self, scores: &[PlayerScore]) {
        info!("Match finished with {} scores", scores.len());
        self.rotate_host().await;
    }

    async fn on_beatmap_selected(&mut self, beatmap: Option<Beatmap>) {
        self.current_beatmap = beatmap;

        if !self.gate.is_restricted() {
            return;
        }

        let Some(rating) = self.current_beatmap.as_ref().and_then(Beatmap::rating) else {
            debug!("Beatmap has no usable star rating, skipping difficulty check");
            return;
        };

        let host = self.host_label();

        if self.gate.too_low(rating) {
            info!("Beatmap too low: {:.2}* < {}*", rating, self.gate.min_stars);
            let message = format!(
                "{} this beatmap is too low, minimum stars are {}. If you start with these settings, match will be aborted and host will be passed to the next in line.",
                host, self.gate.min_stars
            );
            self.say(&message).await;
            self.metrics.record_warning("min");
        }

        if self.gate.too_high(rating) {
            info!("Beatmap too high: {:.2}* > {}*", rating, self.gate.max_stars);
            let message = format!(
                "{} this beatmap is too high, maximum stars are {}. If you start with these settings, match will be aborted and host will be passed to the next in line.",
                host, self.gate.max_stars
            );
            self.say(&message).await;
            self.metrics.record_warning("max");
        }
    }

    async fn on_match_started(&mut self) {
        if !self.gate.is_restricted() {
            return;
        }

        let Some(rating) = self.current_beatmap.as_ref().and_then(Beatmap::rating) else {
            return;
        };

        if !self.gate.out_of_band(rating) {
            return;
        }

        warn!(
            "Match started on an out-of-band beatmap ({:.2}*), aborting",
            rating
        );

        let message = format!("{} you have been warned.", self.host_label());
        self.say(&message).await;
        self.metrics.record_warning("final");

        let result = self.client.abort_match().await;
        self.check("abort_match", result);
        self.metrics.record_abort();

        self.rotate_host().await;
    }

    fn on_host_changed(&mut self, player: PlayerName) {
        if self.current_host.as_deref() != Some(player.as_str()) {
            debug!("Host is now {}", player);
            self.current_host = Some(player);
        }
    }

    /// Hand host to the next player in line and announce the queue
    async fn rotate_host(&mut self) {
        match self.queue.advance(self.current_host.as_deref()) {
            Some(next) => {
                info!("Passing host to {}", next);
                let result = self.client.set_host(&next).await;
                self.check("set_host", result);
                self.current_host = Some(next);
                self.metrics.record_rotation();
            }
            None => debug!("Nobody left to pass host to"),
        }

        self.announce_next_hosts().await;
    }

    async fn announce_next_hosts(&self) {
        let message = format!("Upcoming hosts: {}", self.queue.upcoming().join(", "));
        self.say(&message).await;
    }

    async fn say(&self, text: &str) {
        let result = self.client.send_message(text).await;
        self.check("send_message", result);
    }

    fn check(&self, command: &str, result: Result<()>) {
        if let Err(e) = result {
            warn!("Lobby command {} failed: {}", command, e);
            self.metrics.record_command_failure(command);
        }
    }

    fn host_label(&self) -> String {
        self.current_host
            .clone()
            .unwrap_or_else(|| "Host".to_string())
    }

    fn publish_snapshot(&self) {
        self.metrics
            .update_queue(self.queue.len(), self.queue.already_hosted().len());

        self.snapshot_tx.send_replace(LobbySnapshot {
            current_host: self.current_host.clone(),
            upcoming_hosts: self.queue.upcoming(),
            already_hosted: self.queue.already_hosted().to_vec(),
            current_beatmap: self.current_beatmap.clone(),
            events_handled: self.events_handled,
        });
    }
}
