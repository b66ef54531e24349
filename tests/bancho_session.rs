//! End-to-end session against a scripted Bancho server
//!
//! A local TCP listener plays the part of the IRC gateway: it accepts the
//! login, confirms the JOIN, emits BanchoBot notices and records every line
//! the bot writes back.

use osu_autohost::bancho::{BanchoClient, BanchoConnection, EventTranslator, UnratedBeatmapLookup};
use osu_autohost::config::BanchoSettings;
use osu_autohost::lobby::{DifficultyGate, LobbyClient, LobbyController};
use osu_autohost::service::{run_event_loop, StopReason};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::time::timeout;

const CHANNEL: &str = "#mp_42";

async fn send(writer: &mut OwnedWriteHalf, line: &str) {
    writer
        .write_all(format!("{}\r\n", line).as_bytes())
        .await
        .unwrap();
}

fn notice(text: &str) -> String {
    format!(":BanchoBot!cho@ppy.sh PRIVMSG {} :{}", CHANNEL, text)
}

#[tokio::test]
async fn test_session_rotates_host_over_the_wire() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut writer) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut received = Vec::new();

        // PASS, NICK, USER
        for _ in 0..3 {
            received.push(lines.next_line().await.unwrap().unwrap());
        }
        send(&mut writer, ":cho.ppy.sh 001 autohost :Welcome to the osu!Bancho.").await;

        let join = lines.next_line().await.unwrap().unwrap();
        assert_eq!(join, format!("JOIN {}", CHANNEL));
        received.push(join);
        send(&mut writer, &format!(":autohost!cho@ppy.sh JOIN :{}", CHANNEL)).await;

        for line in [
            notice("autohost joined in slot 1."),
            notice("peppy joined in slot 2."),
            "PING :cho.ppy.sh".to_string(),
            // chatter from players is ignored
            format!(":peppy!cho@ppy.sh PRIVMSG {} :The match has finished!", CHANNEL),
            notice("The match has started!"),
            notice("peppy finished playing (Score: 727000, PASSED)."),
            notice("The match has finished!"),
        ] {
            send(&mut writer, &line).await;
        }

        let handover = format!("PRIVMSG {} :!mp host peppy", CHANNEL);
        while let Ok(Some(line)) = lines.next_line().await {
            let done = line == handover;
            received.push(line);
            if done {
                break;
            }
        }

        send(&mut writer, &notice("Closed the match")).await;

        while let Ok(Some(line)) = lines.next_line().await {
            let done = line.starts_with("QUIT");
            received.push(line);
            if done {
                break;
            }
        }
        received
    });

    let settings = BanchoSettings {
        host: "127.0.0.1".to_string(),
        port,
        username: "autohost".to_string(),
        password: "hunter2".to_string(),
        ..BanchoSettings::default()
    };

    let session = async {
        let mut connection = BanchoConnection::connect(&settings, Duration::from_secs(5)).await?;
        connection.join(CHANNEL).await?;

        let translator = EventTranslator::new("autohost", Arc::new(UnratedBeatmapLookup));
        let (client, events) = BanchoClient::start(connection, CHANNEL, translator);
        let mut controller = LobbyController::new(client.clone(), DifficultyGate::unrestricted())?;

        let reason = run_event_loop(&mut controller, events, std::future::pending()).await;
        client.disconnect().await?;

        anyhow::Ok((reason, controller.current_host().map(str::to_string)))
    };

    let (reason, host) = timeout(Duration::from_secs(10), session)
        .await
        .expect("session timed out")
        .unwrap();
    assert_eq!(reason, StopReason::RoomClosed);
    assert_eq!(host.as_deref(), Some("peppy"));

    let received = timeout(Duration::from_secs(10), server)
        .await
        .expect("server timed out")
        .unwrap();

    assert_eq!(received[0], "PASS hunter2");
    assert!(received.contains(&"PONG :cho.ppy.sh".to_string()));

    let prefix = format!("PRIVMSG {} :", CHANNEL);
    let privmsgs: Vec<&str> = received
        .iter()
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .collect();
    assert_eq!(
        privmsgs,
        vec![
            "!mp host autohost",
            "Upcoming hosts: autohost",
            "Upcoming hosts: autohost, peppy",
            "!mp host peppy",
            "Upcoming hosts: ",
        ]
    );
    assert!(received.last().is_some_and(|line| line.starts_with("QUIT")));
}

#[tokio::test]
async fn test_dropped_connection_ends_session() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut writer) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        for _ in 0..3 {
            lines.next_line().await.unwrap();
        }
        send(&mut writer, ":cho.ppy.sh 001 autohost :Welcome to the osu!Bancho.").await;
        lines.next_line().await.unwrap();
        send(&mut writer, &format!(":autohost!cho@ppy.sh JOIN :{}", CHANNEL)).await;
        send(&mut writer, &notice("peppy joined in slot 2.")).await;

        let announce = format!("PRIVMSG {} :Upcoming hosts: peppy", CHANNEL);
        while let Ok(Some(line)) = lines.next_line().await {
            if line == announce {
                break;
            }
        }
        // dropping both halves closes the socket
    });

    let settings = BanchoSettings {
        host: "127.0.0.1".to_string(),
        port,
        username: "autohost".to_string(),
        password: "hunter2".to_string(),
        ..BanchoSettings::default()
    };

    let session = async {
        let mut connection = BanchoConnection::connect(&settings, Duration::from_secs(5)).await?;
        connection.join(CHANNEL).await?;

        let translator = EventTranslator::new("autohost", Arc::new(UnratedBeatmapLookup));
        let (client, events) = BanchoClient::start(connection, CHANNEL, translator);
        let mut controller = LobbyController::new(client.clone(), DifficultyGate::unrestricted())?;

        let reason = run_event_loop(&mut controller, events, std::future::pending()).await;
        anyhow::Ok((reason, controller.queue().upcoming(), client.is_connected()))
    };

    let (reason, upcoming, connected) = timeout(Duration::from_secs(10), session)
        .await
        .expect("session timed out")
        .unwrap();

    assert_eq!(reason, StopReason::Disconnected);
    assert_eq!(upcoming, vec!["peppy"]);
    assert!(!connected);
}
