//! IRC line parsing and BanchoBot multiplayer notices
//!
//! Bancho speaks a small subset of RFC 1459. Lobby state changes arrive as
//! PRIVMSGs from `BanchoBot` in the `#mp_<id>` channel; this module turns
//! both layers into typed values.

use crate::types::PlayerScore;

/// Nick of the server-side referee bot
pub const BANCHO_BOT: &str = "BanchoBot";

/// Numeric reply sent after a successful login
pub const RPL_WELCOME: &str = "001";

/// Numeric reply for a rejected password
pub const ERR_PASSWDMISMATCH: &str = "464";

/// Numeric reply for an unknown channel
pub const ERR_NOSUCHCHANNEL: &str = "403";

/// A single parsed IRC line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub prefix: Option<String>,
    pub command: String,
    pub params: Vec<String>,
}

impl IrcMessage {
    /// Parse a raw line without its trailing CRLF
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return None;
        }

        let (prefix, rest) = match line.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, rest) = stripped.split_once(' ')?;
                (Some(prefix.to_string()), rest)
            }
            None => (None, line),
        };

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };

        let mut words = head.split_whitespace();
        let command = words.next()?.to_string();
        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Some(Self {
            prefix,
            command,
            params,
        })
    }

    /// Nick part of the prefix (`nick!user@host`)
    pub fn nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .map(|prefix| prefix.split('!').next().unwrap_or(prefix))
    }

    /// Last parameter, which holds the text of PRIVMSG and most numerics
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Target of a PRIVMSG
    pub fn target(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }
}

/// Lobby state changes announced by BanchoBot
#[derive(Debug, Clone, PartialEq)]
pub enum MultiplayerNotice {
    PlayerJoined { player: String, slot: u8 },
    PlayerLeft { player: String },
    HostChanged { player: String },
    BeatmapChanged { beatmap_id: u64, title: String },
    MatchStarted,
    PlayerFinished(PlayerScore),
    MatchFinished,
    MatchClosed,
}

impl MultiplayerNotice {
    /// Parse the text of a BanchoBot message; unknown lines yield `None`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        match text {
            "The match has started!" => return Some(Self::MatchStarted),
            "The match has finished!" => return Some(Self::MatchFinished),
            "Closed the match" => return Some(Self::MatchClosed),
            _ => {}
        }

        if let Some((player, rest)) = text.split_once(" joined in slot ") {
            let slot = rest
                .trim_end_matches('.')
                .split_whitespace()
                .next()?
                .trim_end_matches('.')
                .parse()
                .ok()?;
            return Some(Self::PlayerJoined {
                player: player.to_string(),
                slot,
            });
        }

        if let Some(player) = text.strip_suffix(" left the game.") {
            return Some(Self::PlayerLeft {
                player: player.to_string(),
            });
        }

        if let Some(player) = text.strip_suffix(" became the host.") {
            return Some(Self::HostChanged {
                player: player.to_string(),
            });
        }

        if let Some(player) = text.strip_prefix("Changed match host to ") {
            return Some(Self::HostChanged {
                player: player.to_string(),
            });
        }

        if let Some(rest) = text.strip_prefix("Beatmap changed to: ") {
            // "Artist - Title [Diff] (https://osu.ppy.sh/b/123)"
            let (title, link) = rest.rsplit_once(" (")?;
            let beatmap_id = beatmap_id_from_link(link.trim_end_matches(')'))?;
            return Some(Self::BeatmapChanged {
                beatmap_id,
                title: title.to_string(),
            });
        }

        if let Some(rest) = text.strip_prefix("Changed beatmap to ") {
            // "https://osu.ppy.sh/b/123 Artist - Title [Diff]"
            let (link, title) = rest.split_once(' ').unwrap_or((rest, ""));
            let beatmap_id = beatmap_id_from_link(link)?;
            return Some(Self::BeatmapChanged {
                beatmap_id,
                title: title.to_string(),
            });
        }

        if let Some((player, rest)) = text.split_once(" finished playing (Score: ") {
            // "1234, PASSED)."
            let (score, status) = rest.split_once(", ")?;
            return Some(Self::PlayerFinished(PlayerScore {
                player: player.to_string(),
                score: score.parse().ok()?,
                passed: status.starts_with("PASSED"),
            }));
        }

        None
    }
}

fn beatmap_id_from_link(link: &str) -> Option<u64> {
    link.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

/// Canonical form used to compare display names with IRC nicks
pub fn normalize_username(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

pub fn pass(password: &str) -> String {
    format!("PASS {}", password)
}

pub fn nick(username: &str) -> String {
    format!("NICK {}", username)
}

pub fn user(username: &str) -> String {
    format!("USER {} 0 * :{}", username, username)
}

pub fn join(channel: &str) -> String {
    format!("JOIN {}", channel)
}

pub fn pong(token: &str) -> String {
    format!("PONG :{}", token)
}

pub fn quit() -> String {
    "QUIT :autohost shutting down".to_string()
}

pub fn privmsg(target: &str, text: &str) -> String {
    // newlines would smuggle extra commands onto the wire
    let text = text.replace(['\r', '\n'], " ");
    format!("PRIVMSG {} :{}", target, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privmsg() {
        let msg =
            IrcMessage::parse(":BanchoBot!cho@ppy.sh PRIVMSG #mp_123 :Kenji joined in slot 3.\r\n")
                .unwrap();
        assert_eq!(msg.nick(), Some("BanchoBot"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.target(), Some("#mp_123"));
        assert_eq!(msg.trailing(), Some("Kenji joined in slot 3."));
    }

    #[test]
    fn test_parse_ping_and_numeric() {
        let ping = IrcMessage::parse("PING :cho.ppy.sh").unwrap();
        assert_eq!(ping.prefix, None);
        assert_eq!(ping.command, "PING");
        assert_eq!(ping.trailing(), Some("cho.ppy.sh"));

        let welcome = IrcMessage::parse(":cho.ppy.sh 001 autohost :Welcome to the osu!Bancho.")
            .unwrap();
        assert_eq!(welcome.command, RPL_WELCOME);
        assert_eq!(welcome.params, vec!["autohost", "Welcome to the osu!Bancho."]);

        assert!(IrcMessage::parse("").is_none());
    }

    #[test]
    fn test_player_notices() {
        assert_eq!(
            MultiplayerNotice::parse("Kenji Ninuma joined in slot 3."),
            Some(MultiplayerNotice::PlayerJoined {
                player: "Kenji Ninuma".to_string(),
                slot: 3
            })
        );
        assert_eq!(
            MultiplayerNotice::parse("peppy joined in slot 12 for team red."),
            Some(MultiplayerNotice::PlayerJoined {
                player: "peppy".to_string(),
                slot: 12
            })
        );
        assert_eq!(
            MultiplayerNotice::parse("peppy left the game."),
            Some(MultiplayerNotice::PlayerLeft {
                player: "peppy".to_string()
            })
        );
        assert_eq!(
            MultiplayerNotice::parse("peppy became the host."),
            Some(MultiplayerNotice::HostChanged {
                player: "peppy".to_string()
            })
        );
        assert_eq!(
            MultiplayerNotice::parse("Changed match host to peppy"),
            Some(MultiplayerNotice::HostChanged {
                player: "peppy".to_string()
            })
        );
    }

    #[test]
    fn test_beatmap_notices() {
        assert_eq!(
            MultiplayerNotice::parse(
                "Beatmap changed to: Kenji Ninuma - DISCOPRINCE (Zallius) [Normal] (https://osu.ppy.sh/b/75)"
            ),
            Some(MultiplayerNotice::BeatmapChanged {
                beatmap_id: 75,
                title: "Kenji Ninuma - DISCOPRINCE (Zallius) [Normal]".to_string()
            })
        );
        assert_eq!(
            MultiplayerNotice::parse(
                "Changed beatmap to https://osu.ppy.sh/b/75 Kenji Ninuma - DISCOPRINCE"
            ),
            Some(MultiplayerNotice::BeatmapChanged {
                beatmap_id: 75,
                title: "Kenji Ninuma - DISCOPRINCE".to_string()
            })
        );
    }

    #[test]
    fn test_match_notices() {
        assert_eq!(
            MultiplayerNotice::parse("The match has started!"),
            Some(MultiplayerNotice::MatchStarted)
        );
        assert_eq!(
            MultiplayerNotice::parse("The match has finished!"),
            Some(MultiplayerNotice::MatchFinished)
        );
        assert_eq!(
            MultiplayerNotice::parse("Closed the match"),
            Some(MultiplayerNotice::MatchClosed)
        );
        assert_eq!(
            MultiplayerNotice::parse("peppy finished playing (Score: 1048576, PASSED)."),
            Some(MultiplayerNotice::PlayerFinished(PlayerScore {
                player: "peppy".to_string(),
                score: 1048576,
                passed: true
            }))
        );
        assert_eq!(MultiplayerNotice::parse("peppy moved to slot 4"), None);
        assert_eq!(MultiplayerNotice::parse("All players are ready"), None);
    }

    #[test]
    fn test_outbound_lines() {
        assert_eq!(privmsg("#mp_1", "hi\r\nQUIT"), "PRIVMSG #mp_1 :hi  QUIT");
        assert_eq!(pong("cho.ppy.sh"), "PONG :cho.ppy.sh");
        assert_eq!(join("#mp_1"), "JOIN #mp_1");
        assert_eq!(normalize_username("Kenji Ninuma"), "kenji_ninuma");
    }
}
