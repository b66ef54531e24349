//! Bancho IRC connection setup
//!
//! Opens the TCP connection, logs in and joins the multiplayer channel. Any
//! failure here is fatal; there is no retry.

use crate::bancho::messages::{self, IrcMessage, ERR_NOSUCHCHANNEL, ERR_PASSWDMISMATCH, RPL_WELCOME};
use crate::config::BanchoSettings;
use crate::error::{AutohostError, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, trace};

/// Line reader over the read half of the socket
pub type LineReader = Lines<BufReader<OwnedReadHalf>>;

/// Logged-in connection to the Bancho IRC gateway
pub struct BanchoConnection {
    lines: LineReader,
    writer: OwnedWriteHalf,
    username: String,
    timeout: Duration,
}

impl BanchoConnection {
    /// Connect and authenticate
    pub async fn connect(settings: &BanchoSettings, connect_timeout: Duration) -> Result<Self> {
        let address = format!("{}:{}", settings.host, settings.port);
        info!("Connecting to {}", address);

        let stream = timeout(connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| AutohostError::ConnectionFailed {
                address: address.clone(),
                message: "timed out".to_string(),
            })?
            .map_err(|e| AutohostError::ConnectionFailed {
                address: address.clone(),
                message: e.to_string(),
            })?;

        let (read_half, writer) = stream.into_split();
        let mut connection = Self {
            lines: BufReader::new(read_half).lines(),
            writer,
            username: settings.username.clone(),
            timeout: connect_timeout,
        };

        connection.login(&settings.password).await?;
        info!("Logged in as {}", connection.username);
        Ok(connection)
    }

    async fn login(&mut self, password: &str) -> Result<()> {
        let username = self.username.clone();
        self.send_line(&messages::pass(password)).await?;
        self.send_line(&messages::nick(&username)).await?;
        self.send_line(&messages::user(&username)).await?;

        loop {
            let message = self.next_message().await?;
            match message.command.as_str() {
                RPL_WELCOME => return Ok(()),
                ERR_PASSWDMISMATCH => {
                    return Err(AutohostError::AuthenticationFailed {
                        username,
                        message: message.trailing().unwrap_or("bad password").to_string(),
                    }
                    .into())
                }
                _ => {}
            }
        }
    }

    /// Join `channel` and wait for the server to confirm
    pub async fn join(&mut self, channel: &str) -> Result<()> {
        self.send_line(&messages::join(channel)).await?;

        loop {
            let message = self.next_message().await?;
            match message.command.as_str() {
                "JOIN"
                    if message.trailing() == Some(channel)
                        && message
                            .nick()
                            .is_some_and(|nick| nick.eq_ignore_ascii_case(&self.username)) =>
                {
                    info!("Joined {}", channel);
                    return Ok(());
                }
                ERR_NOSUCHCHANNEL => {
                    return Err(AutohostError::Protocol {
                        message: format!("no such channel: {}", channel),
                    }
                    .into())
                }
                _ => {}
            }
        }
    }

    /// Next non-PING message, answering PINGs on the way
    async fn next_message(&mut self) -> Result<IrcMessage> {
        loop {
            let line = timeout(self.timeout, self.lines.next_line())
                .await
                .map_err(|_| AutohostError::Protocol {
                    message: "timed out waiting for the server".to_string(),
                })??
                .ok_or(AutohostError::Disconnected)?;
            trace!("<< {}", line);

            let Some(message) = IrcMessage::parse(&line) else {
                continue;
            };

            if message.command == "PING" {
                let token = message.trailing().unwrap_or_default().to_string();
                self.send_line(&messages::pong(&token)).await?;
                continue;
            }

            return Ok(message);
        }
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        if line.starts_with("PASS ") {
            debug!(">> PASS ********");
        } else {
            debug!(">> {}", line);
        }
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        Ok(())
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Hand the socket halves over to the long-running reader and writer tasks
    pub fn into_parts(self) -> (LineReader, OwnedWriteHalf) {
        (self.lines, self.writer)
    }
}
