//! csgf-bot: run a csgf.live session with the chat quiz.
//!
//! Usage:
//! ```bash
//! # Run the bot with a config file; the cookie may come from the environment
//! CSGF_COOKIE='session=…' csgf-bot run --config bot.json
//!
//! # Validate a config file and print the effective settings
//! csgf-bot check-config --config bot.json
//! ```

mod tracing_setup;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use csgf_core::{BotConfig, ClientState, VenueActions};
use csgf_http::{fetch_session, HttpClientConfig, HttpVenueClient};
use csgf_quiz::{spawn_advert_ticker, MathQuiz};
use csgf_ws::{Dispatcher, StreamClient, StreamConfig};

#[derive(Parser)]
#[command(
    name = "csgf-bot",
    about = "Real-time csgf.live client running the chat arithmetic quiz",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the session and run the stream client until it fails or Ctrl-C
    Run {
        /// Path to the JSON config file
        #[arg(long)]
        config: PathBuf,

        /// Raw Cookie header of a logged-in session (overrides the config file)
        #[arg(long, env = "CSGF_COOKIE", hide_env_values = true)]
        cookie: Option<String>,
    },

    /// Validate a config file and print the effective settings as JSON
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, cookie } => cmd_run(&config, cookie).await,
        Commands::CheckConfig { config } => cmd_check_config(&config),
    }
}

fn load_config(path: &Path) -> Result<BotConfig> {
    BotConfig::load(path).with_context(|| format!("loading config {}", path.display()))
}

async fn cmd_run(path: &Path, cookie: Option<String>) -> Result<()> {
    let mut config = load_config(path)?;
    if let Some(cookie) = cookie {
        config.cookie = cookie;
    }
    tracing_setup::init_tracing(&config.log);

    if config.cookie.is_empty() {
        bail!("no session cookie: set `cookie` in the config, pass --cookie or set CSGF_COOKIE");
    }

    let http = Arc::new(
        HttpVenueClient::new(HttpClientConfig {
            base_url: config.base_url.clone(),
            cookie: Some(config.cookie.clone()),
            request_timeout: config.request_timeout(),
            throttle: config.throttle_config(),
        })
        .context("building HTTP client")?,
    );
    let session = fetch_session(http.http(), http.base_url())
        .await
        .context("bootstrapping session from the home page")?;
    info!(user_id = %session.user_id, balance = %session.balance, "logged in");

    let state = Arc::new(ClientState::new(&session));
    let actions: Arc<dyn VenueActions> = http;

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(Arc::new(MathQuiz::new(actions.clone(), config.commission_bps())));

    let advert = spawn_advert_ticker(actions, config.advert_interval());

    let stream = StreamClient::new(
        StreamConfig {
            url: config.ws_url.clone(),
            cookie: Some(config.cookie.clone()),
            retry: config.reconnect.to_retry_config(),
            handshake_timeout: config.request_timeout(),
        },
        &session,
        state,
        dispatcher,
    );

    let outcome = tokio::select! {
        err = stream.run() => Err(anyhow::Error::new(err).context("stream client stopped")),
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            info!("interrupted, shutting down");
            Ok(())
        }
    };
    advert.abort();
    outcome
}

fn cmd_check_config(path: &Path) -> Result<()> {
    let mut config = load_config(path)?;
    if !config.cookie.is_empty() {
        config.cookie = "<redacted>".into();
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
