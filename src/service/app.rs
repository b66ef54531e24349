//! Bot service coordination
//!
//! This module wires configuration, the Bancho connection, the lobby
//! controller and the health server together, and runs the event loop until
//! the room closes, the connection drops or a shutdown signal arrives.

use crate::bancho::{
    BanchoClient, BanchoConnection, BeatmapLookup, EventTranslator, OsuApiBeatmapLookup,
    UnratedBeatmapLookup,
};
use crate::config::{AppConfig, LobbySettings, SessionConfig};
use crate::lobby::{EventOutcome, LobbyClient, LobbyController};
use crate::metrics::{HealthServer, HealthServerConfig, HealthServerState, MetricsCollector};
use crate::types::LobbyEvent;
use anyhow::Result;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Why the event loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    RoomClosed,
    Disconnected,
}

/// The running bot
pub struct AutohostService {
    config: AppConfig,
    session: SessionConfig,
    metrics: Arc<MetricsCollector>,
}

impl AutohostService {
    pub fn new(config: AppConfig, session: SessionConfig) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);

        Ok(Self {
            config,
            session,
            metrics,
        })
    }

    /// Connect, set the room up and handle events until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<StopReason>
    where
        F: Future<Output = ()>,
    {
        let mut connection =
            BanchoConnection::connect(&self.config.bancho, self.config.connect_timeout()).await?;
        let own_name = connection.username().to_string();

        let channel = self.session.channel_name();
        connection.join(&channel).await?;

        let lookup = self.beatmap_lookup()?;
        let translator = EventTranslator::new(&own_name, lookup);
        let (client, events) = BanchoClient::start(connection, &channel, translator);

        let mut controller = LobbyController::with_metrics(
            client.clone(),
            self.session.gate(),
            self.metrics.clone(),
        );

        let health_server = if self.config.service.enable_health_server {
            let server = Arc::new(HealthServer::new(
                HealthServerConfig {
                    port: self.config.service.health_port,
                    ..HealthServerConfig::default()
                },
                HealthServerState {
                    metrics_collector: self.metrics.clone(),
                    snapshot: controller.subscribe(),
                    connected: client.connection_flag(),
                    session: self.session.clone(),
                    started_at: Utc::now(),
                },
            ));

            let task_server = server.clone();
            tokio::spawn(async move {
                if let Err(e) = task_server.start().await {
                    error!("Health server failed: {}", e);
                }
            });
            Some(server)
        } else {
            None
        };

        prepare_lobby(
            client.as_ref(),
            &mut controller,
            &own_name,
            &self.config.lobby,
            &self.session,
        )
        .await;

        let reason = run_event_loop(&mut controller, events, shutdown).await;
        info!("Event loop stopped: {:?}", reason);

        if reason != StopReason::Disconnected {
            if let Err(e) = client.disconnect().await {
                warn!("Failed to disconnect cleanly: {}", e);
            }
        }

        if let Some(server) = health_server {
            server.stop();
        }

        Ok(reason)
    }

    fn beatmap_lookup(&self) -> Result<Arc<dyn BeatmapLookup>> {
        if self.config.bancho.api_key.is_empty() {
            warn!("API_KEY not set, star ratings are unavailable and the difficulty band cannot be enforced");
            return Ok(Arc::new(UnratedBeatmapLookup));
        }

        Ok(Arc::new(OsuApiBeatmapLookup::new(
            &self.config.bancho.api_base_url,
            &self.config.bancho.api_key,
            self.config.connect_timeout(),
        )?))
    }
}

/// One-time room setup after joining
///
/// Seeds the queue with the bot, applies settings and mods, renames the room
/// after the session and logs the match link. Command failures are logged and
/// skipped.
pub async fn prepare_lobby(
    client: &dyn LobbyClient,
    controller: &mut LobbyController,
    own_name: &str,
    settings: &LobbySettings,
    session: &SessionConfig,
) {
    controller.seed_host(own_name);

    if let Err(e) = client
        .set_settings(settings.team_mode, settings.win_condition, settings.slots)
        .await
    {
        warn!("Failed to apply room settings: {}", e);
    }

    if let Err(e) = client.set_mods(&settings.mods, settings.freemod).await {
        warn!("Failed to set mods: {}", e);
    }

    if let Err(e) = client.set_name(&session.display_name()).await {
        warn!("Failed to rename room: {}", e);
    }

    info!("Multiplayer Link: {}", session.multiplayer_link());
}

/// Feed events to the controller one at a time
pub async fn run_event_loop<F>(
    controller: &mut LobbyController,
    mut events: mpsc::Receiver<LobbyEvent>,
    shutdown: F,
) -> StopReason
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, leaving the room");
                return StopReason::Shutdown;
            }
            event = events.recv() => match event {
                Some(event) => {
                    if controller.handle_event(event).await == EventOutcome::Closed {
                        return StopReason::RoomClosed;
                    }
                }
                None => {
                    debug!("Event stream ended");
                    return StopReason::Disconnected;
                }
            }
        }
    }
}
