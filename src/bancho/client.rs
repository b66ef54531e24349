//! Bancho-backed lobby client
//!
//! Lobby commands become `!mp` PRIVMSGs queued to a writer task. A reader task
//! answers PINGs, turns BanchoBot notices into [`LobbyEvent`]s and forwards
//! them to the controller, one at a time, over an mpsc channel.

use crate::bancho::connection::{BanchoConnection, LineReader};
use crate::bancho::events::EventTranslator;
use crate::bancho::messages::{self, IrcMessage, MultiplayerNotice, BANCHO_BOT};
use crate::error::{AutohostError, Result};
use crate::lobby::client::LobbyClient;
use crate::types::{LobbyEvent, TeamMode, WinCondition};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Capacity of the event channel towards the controller
const EVENT_BUFFER: usize = 64;

/// Lobby client speaking to BanchoBot through the IRC gateway
pub struct BanchoClient {
    channel: String,
    outbound: mpsc::UnboundedSender<String>,
    connected: Arc<AtomicBool>,
}

impl BanchoClient {
    /// Start the reader and writer tasks for an already joined channel
    pub fn start(
        connection: BanchoConnection,
        channel: &str,
        translator: EventTranslator,
    ) -> (Arc<Self>, mpsc::Receiver<LobbyEvent>) {
        let (lines, writer) = connection.into_parts();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let connected = Arc::new(AtomicBool::new(true));

        tokio::spawn(write_loop(writer, outbound_rx));
        tokio::spawn(read_loop(
            lines,
            channel.to_string(),
            translator,
            outbound.clone(),
            event_tx,
            connected.clone(),
        ));

        let client = Arc::new(Self {
            channel: channel.to_string(),
            outbound,
            connected,
        });

        (client, event_rx)
    }

    /// Whether the reader still sees the server
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Shared flag for health reporting
    pub fn connection_flag(&self) -> Arc<AtomicBool> {
        self.connected.clone()
    }

    fn send_raw(&self, line: String) -> Result<()> {
        self.outbound
            .send(line)
            .map_err(|_| AutohostError::Disconnected.into())
    }

    fn say(&self, text: &str) -> Result<()> {
        self.send_raw(messages::privmsg(&self.channel, text))
    }

    fn mp(&self, command: &str) -> Result<()> {
        self.say(&format!("!mp {}", command))
            .map_err(|e| {
                AutohostError::CommandFailed {
                    command: format!("!mp {}", command),
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

#[async_trait]
impl LobbyClient for BanchoClient {
    async fn set_settings(
        &self,
        team_mode: TeamMode,
        win_condition: WinCondition,
        slots: u8,
    ) -> Result<()> {
        self.mp(&format!(
            "set {} {} {}",
            team_mode.code(),
            win_condition.code(),
            slots
        ))
    }

    async fn set_mods(&self, mods: &str, freemod: bool) -> Result<()> {
        let mut mods = mods.trim().to_string();
        if freemod && !mods.to_lowercase().split_whitespace().any(|m| m == "freemod") {
            mods = format!("{} Freemod", mods).trim().to_string();
        }
        self.mp(&format!("mods {}", mods))
    }

    async fn set_name(&self, name: &str) -> Result<()> {
        self.mp(&format!("name {}", name))
    }

    async fn set_host(&self, player: &str) -> Result<()> {
        self.mp(&format!("host {}", player.replace(' ', "_")))
    }

    async fn abort_match(&self) -> Result<()> {
        self.mp("abort")
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        self.say(text)
    }

    async fn disconnect(&self) -> Result<()> {
        info!("Disconnecting from Bancho");
        self.send_raw(messages::quit())
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut outbound: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = outbound.recv().await {
        debug!(">> {}", line);
        let result = async {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\r\n").await
        }
        .await;

        if let Err(e) = result {
            error!("Failed to write to Bancho: {}", e);
            break;
        }
    }
    debug!("Writer task stopped");
}

async fn read_loop(
    mut lines: LineReader,
    channel: String,
    mut translator: EventTranslator,
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::Sender<LobbyEvent>,
    connected: Arc<AtomicBool>,
) {
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                warn!("Bancho closed the connection");
                let _ = events
                    .send(LobbyEvent::TransportError {
                        message: "connection closed by server".to_string(),
                    })
                    .await;
                break;
            }
            Err(e) => {
                let _ = events
                    .send(LobbyEvent::TransportError {
                        message: e.to_string(),
                    })
                    .await;
                break;
            }
        };
        trace!("<< {}", line);

        let Some(message) = IrcMessage::parse(&line) else {
            continue;
        };

        if message.command == "PING" {
            let token = message.trailing().unwrap_or_default();
            if outbound.send(messages::pong(token)).is_err() {
                break;
            }
            continue;
        }

        let Some(notice) = referee_notice(&message, &channel) else {
            continue;
        };

        if let Some(event) = translator.translate(notice).await {
            if events.send(event).await.is_err() {
                debug!("Event receiver dropped, stopping reader");
                break;
            }
        }
    }

    connected.store(false, Ordering::Relaxed);
}

/// BanchoBot notice addressed to our room, if `message` is one
fn referee_notice(message: &IrcMessage, channel: &str) -> Option<MultiplayerNotice> {
    if message.command != "PRIVMSG" || message.nick() != Some(BANCHO_BOT) {
        return None;
    }
    if message.target() != Some(channel) {
        return None;
    }
    MultiplayerNotice::parse(message.trailing()?)
}
