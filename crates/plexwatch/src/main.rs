//! # plexwatch
//!
//! Subscribes to a Plex Media Server's notification socket and logs every
//! notification until interrupted or the server closes the stream.

#![deny(unsafe_code)]

mod handlers;
mod logging;
mod signals;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use parking_lot::Mutex;
use plexwatch_client::{Connector, NotificationClient, NotifyError, TungsteniteConnector};
use plexwatch_settings::PlexwatchSettings;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Stream Plex Media Server notifications to the log.
#[derive(Parser, Debug)]
#[command(name = "plexwatch", about = "Stream Plex Media Server notifications to the log")]
struct Cli {
    /// Server base address, e.g. `http://192.168.1.20:32400`.
    #[arg(long)]
    url: Option<String>,

    /// Plex auth token (sent as `X-Plex-Token`).
    #[arg(long)]
    token: Option<String>,

    /// Client identifier (sent as `X-Plex-Client-Identifier`).
    #[arg(long)]
    client_id: Option<String>,

    /// Settings file (defaults to `~/.plexwatch/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,

    /// Default log filter (`RUST_LOG` still wins).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Flags override settings file and environment.
    fn apply(&self, settings: &mut PlexwatchSettings) {
        if let Some(url) = &self.url {
            settings.server.url.clone_from(url);
        }
        if let Some(token) = &self.token {
            settings.server.token.clone_from(token);
        }
        if let Some(id) = &self.client_id {
            settings.server.client_identifier = Some(id.clone());
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
        if self.json_logs {
            settings.logging.json = true;
        }
    }
}

type SessionOutcome = Result<(), NotifyError>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(plexwatch_settings::settings_path);
    let mut settings = plexwatch_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("Failed to load settings from {}", settings_path.display()))?;
    args.apply(&mut settings);

    logging::init_subscriber(&settings.logging.level, settings.logging.json);
    settings.validate().context("Invalid settings")?;
    if settings.server.token.is_empty() {
        warn!("no token configured, the server will likely refuse the connection");
    }

    run(&settings).await
}

async fn run(settings: &PlexwatchSettings) -> Result<()> {
    run_with(
        settings,
        &TungsteniteConnector::new(),
        signals::wait_for_shutdown_signal(),
    )
    .await
}

async fn run_with<C, S>(settings: &PlexwatchSettings, connector: &C, shutdown: S) -> Result<()>
where
    C: Connector + ?Sized,
    S: Future<Output = std::io::Result<()>>,
{
    let (tx, mut outcome) = oneshot::channel::<SessionOutcome>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let error_tx = Arc::clone(&tx);
    let on_error = move |err: NotifyError| {
        if let Some(tx) = error_tx.lock().take() {
            let _ = tx.send(Err(err));
        }
    };
    let on_done = move || {
        if let Some(tx) = tx.lock().take() {
            let _ = tx.send(Ok(()));
        }
    };

    let cancel = CancellationToken::new();
    let client = NotificationClient::from_settings(settings);
    debug!(?client, "subscribing");
    let subscription = client
        .subscribe_with(connector, handlers::logging_events(), cancel.clone(), on_error, on_done)
        .await;

    let mut interrupted = false;
    let result = tokio::select! {
        result = &mut outcome => result,
        signal = shutdown => {
            if let Err(e) = signal {
                warn!(error = %e, "signal handler failed, shutting down");
            }
            info!("shutdown signal received, closing notification stream");
            interrupted = true;
            cancel.cancel();
            (&mut outcome).await
        }
    };

    // An outcome can arrive while the session is still up, e.g. a failed
    // heartbeat. Tear it down either way.
    cancel.cancel();
    if let Some(report) = subscription.wait().await {
        debug!(?report, "session finished");
    }

    match result.map_err(|_| anyhow!("session ended without reporting an outcome"))? {
        Ok(()) => {
            info!("notification stream closed");
            Ok(())
        }
        Err(err @ NotifyError::CloseTimeout { .. }) if interrupted => {
            warn!(error = %err, "server did not acknowledge close");
            Ok(())
        }
        Err(err) => Err(err).context("Notification session failed"),
    }
}
