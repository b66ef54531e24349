//! Main entry point for the osu-autohost bot
//!
//! Parses the room and star band from the command line, loads credentials
//! from the environment or a config file, and runs the bot until the room
//! closes or the process is interrupted.

use anyhow::Result;
use clap::Parser;
use osu_autohost::config::{AppConfig, SessionConfig};
use osu_autohost::service::{AutohostService, StopReason};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// osu-autohost - automatic host rotation for osu! multiplayer rooms
#[derive(Parser)]
#[command(
    name = "osu-autohost",
    version,
    about = "Rotates host in an osu! multiplayer room and enforces a star rating band",
    long_about = "osu-autohost joins an existing multiplayer room (create it first with \
                 `!mp make <name>`), passes host to the next player in line after every \
                 match and, when a star band is given, warns about and aborts matches on \
                 beatmaps outside it. Credentials come from OSU_USER, OSU_PASS and API_KEY."
)]
struct Args {
    /// Multiplayer room id (`12345` or `#mp_12345`)
    #[arg(value_name = "ROOM")]
    room: String,

    /// Minimum star rating, 0 for none
    #[arg(value_name = "MIN_STARS", allow_hyphen_values = true)]
    min_stars: Option<String>,

    /// Maximum star rating, 0 for none
    #[arg(value_name = "MAX_STARS", allow_hyphen_values = true)]
    max_stars: Option<String>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Lobby name override
    #[arg(long, value_name = "NAME", help = "Override the base lobby name")]
    lobby_name: Option<String>,

    /// Health server port; enables the server
    #[arg(long, value_name = "PORT", help = "Serve /health, /metrics and /stats on PORT")]
    health_port: Option<u16>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without connecting")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("SIGINT received. Closing lobby and exiting...");
        },
        _ = terminate => {
            info!("SIGTERM received. Closing lobby and exiting...");
        },
    }
}

/// Display startup banner with session information
fn display_startup_banner(config: &AppConfig, session: &SessionConfig) {
    info!("osu-autohost {}", osu_autohost::VERSION);
    info!("   User: {}", config.bancho.username);
    info!("   Server: {}", config.irc_address());
    info!("   Room: {}", session.channel_name());
    info!("   Lobby name: {}", session.display_name());
    match session.gate().describe() {
        Some(band) => info!("   Star band: {}", band),
        None => info!("   Star band: unrestricted"),
    }
    info!(
        "   Beatmap lookups: {}",
        if config.bancho.api_key.is_empty() {
            "disabled"
        } else {
            "enabled"
        }
    );
    if config.service.enable_health_server {
        info!("   Health port: {}", config.service.health_port);
    }
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<(AppConfig, SessionConfig)> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(lobby_name) = &args.lobby_name {
        config.lobby.name = lobby_name.clone();
    }

    if let Some(health_port) = args.health_port {
        config.service.enable_health_server = true;
        config.service.health_port = health_port;
    }

    osu_autohost::config::validate_config(&config)?;

    let session = SessionConfig::from_args(
        &args.room,
        args.min_stars.as_deref(),
        args.max_stars.as_deref(),
        &config.lobby.name,
    )?;

    Ok((config, session))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, session) = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config, &session);

    if args.dry_run {
        info!("Dry run completed - exiting without connecting");
        return Ok(());
    }

    let service = AutohostService::new(config, session)?;

    match service.run(wait_for_shutdown_signal()).await {
        Ok(StopReason::Disconnected) => {
            error!("Lost connection to Bancho");
            std::process::exit(1);
        }
        Ok(reason) => {
            info!("osu-autohost stopped ({:?})", reason);
            Ok(())
        }
        Err(e) => {
            error!("Failed to run bot: {:#}", e);
            std::process::exit(1);
        }
    }
}
