//! mapwalk client entry point.
//!
//! Connects to the relay server, shows every connected user as a marker, and
//! walks the local user's marker with the W/A/S/D keys.
//!
//! # Usage
//!
//! ```text
//! mapwalk [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Configuration file [env: MAPWALK_CONFIG]
//!   --server-url <URL>    Relay server endpoint [env: MAPWALK_SERVER_URL]
//!   --seed <N>            Seed for the starting coordinate (reproducible runs)
//! ```
//!
//! Keys are read from stdin a line at a time: type `w`, `a`, `s` or `d`
//! (several per line is fine) and press Enter.
//!
//! # Configuration precedence
//!
//! 1. Command-line flags (and their environment variables).
//! 2. The TOML configuration file.
//! 3. Built-in defaults.
//!
//! `RUST_LOG` overrides the configured log level.
//!
//! # Event loop
//!
//! Everything runs on a single-threaded Tokio runtime.  Connection events,
//! key events and Ctrl+C are polled by one `tokio::select!`; each event is
//! handled to completion before the next is taken, so the session state
//! needs no locking.

use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::EnvFilter;

use mapwalk_client::application::input_controller::KeyOutcome;
use mapwalk_client::application::map_view::MapView;
use mapwalk_client::application::session_client::{Outbound, SessionClient, SessionError};
use mapwalk_client::infrastructure::keyboard::spawn_stdin_reader;
use mapwalk_client::infrastructure::map_view::console::ConsoleMapView;
use mapwalk_client::infrastructure::network::{NetworkEvent, ServerConnection};
use mapwalk_client::infrastructure::storage::config::{
    load_config, validate_server_url, ClientConfig,
};
use mapwalk_core::KeyInput;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Walk a marker around a shared map.
#[derive(Debug, Parser)]
#[command(
    name = "mapwalk",
    about = "Shared-map client: every user is a marker, W/A/S/D moves yours",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    ///
    /// Without it, the platform config directory is searched and a missing
    /// file means defaults.
    #[arg(long, env = "MAPWALK_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket endpoint of the relay server.  Overrides `server.url`.
    #[arg(long, env = "MAPWALK_SERVER_URL")]
    server_url: Option<String>,

    /// Seed for the random starting coordinate.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Loads the configuration file and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the server URL
    /// override is not a `ws://`/`wss://` URL.
    fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = load_config(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "failed to load configuration".to_string(),
        })?;

        if let Some(url) = &self.server_url {
            validate_server_url(url).context("invalid --server-url")?;
            config.server.url = url.clone();
        }
        Ok(config)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

// ── Event loop ────────────────────────────────────────────────────────────────

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    ConnectionClosed,
    Shutdown,
}

/// Drives `client` from connection events and key events until the
/// connection closes or `shutdown` resolves.
///
/// Connection events take priority over keys when both are ready.
///
/// # Errors
///
/// Returns an error only if the map cannot be rendered when the connection
/// opens; every per-message failure is logged and skipped.
async fn run_event_loop<V, O, R>(
    client: &mut SessionClient<V, O>,
    events: &mut mpsc::Receiver<NetworkEvent>,
    keys: &mut mpsc::Receiver<KeyInput>,
    rng: &mut R,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<LoopExit>
where
    V: MapView,
    O: Outbound,
    R: Rng,
{
    tokio::pin!(shutdown);
    let mut keys_open = true;

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!("shutdown requested");
                return Ok(LoopExit::Shutdown);
            }

            event = events.recv() => match event {
                Some(NetworkEvent::Opened) => {
                    client.on_open(rng).context("failed to start session")?;
                }
                Some(NetworkEvent::Message(text)) => match client.on_text(&text) {
                    Ok(()) => {}
                    Err(e @ SessionError::NotOpen(_)) => debug!("frame ignored: {e}"),
                    Err(e) => warn!("message dropped: {e}"),
                },
                Some(NetworkEvent::Closed) | None => {
                    client.on_close();
                    return Ok(LoopExit::ConnectionClosed);
                }
            },

            key = keys.recv(), if keys_open => match key {
                Some(input) => match client.on_key(input) {
                    KeyOutcome::Moved { .. } | KeyOutcome::Ignored => {}
                    outcome => trace!(?input, ?outcome, "key not applied"),
                },
                None => {
                    debug!("key input closed");
                    keys_open = false;
                }
            },
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(&config.logging.level);

    info!(
        server = %config.server.url,
        zoom = config.map.zoom,
        mode = %config.map.mode,
        "mapwalk starting"
    );

    let mut rng = cli.rng();
    let (mut events, outbound) = ServerConnection::start(config.server.url.clone());
    let mut keys = spawn_stdin_reader();
    let mut client = SessionClient::new(config.to_settings(), ConsoleMapView::new(), outbound);

    let exit = run_event_loop(&mut client, &mut events, &mut keys, &mut rng, ctrl_c()).await?;

    info!(?exit, "mapwalk stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
