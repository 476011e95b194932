//! gesture-pilot-daemon: background daemon for hand-gesture control
//!
//! This daemon provides:
//! - A gesture pipeline fed with landmark frames over IPC
//! - Control event fan-out to subscribed controllers
//! - Status queries for the current gesture and fist state
//!
//! Landmark detection itself happens in the client; the daemon only
//! consumes its output.

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gesture_pilot::config::Config;
use gesture_pilot::events::ControlEvent;
use gesture_pilot::ipc::Server;
use gesture_pilot::lifecycle::ShutdownSignal;
use gesture_pilot::pipeline::{Frame, GesturePipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "gesture-pilot-daemon starting"
    );

    // Load configuration
    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, "configuration loaded");

    // Create shutdown signal handler
    let shutdown = ShutdownSignal::new();

    // IPC server -> pipeline
    let (frame_tx, frame_rx) = mpsc::channel::<Frame>(32);
    // Pipeline -> IPC subscribers and status tracking
    let (event_tx, _event_rx) = broadcast::channel::<ControlEvent>(256);

    let mut pipeline = GesturePipeline::new(&config.tuning, event_tx.clone())
        .context("invalid gesture tuning")?;

    let server = Server::new(&config.socket_path, frame_tx, event_tx.clone())?;

    let mut status_rx = event_tx.subscribe();
    let server_for_events = &server;

    info!("daemon initialized, entering main loop");

    tokio::select! {
        // Run the pipeline (processes submitted frames)
        _ = pipeline.run(frame_rx) => {
            info!("gesture pipeline exited");
        }

        // Run the IPC server (accepts client connections)
        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        // Keep the status snapshot in sync with pipeline output
        _ = async {
            loop {
                match status_rx.recv().await {
                    Ok(event) => server_for_events.apply_event(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "status receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("status tracker exited");
        }

        // Wait for shutdown signal
        result = shutdown.wait() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(e) => error!(?e, "failed to register signal handlers"),
            }
        }
    }

    // Cleanup
    info!("shutting down...");

    server.shutdown().await;

    info!(
        processed = pipeline.frames_processed(),
        skipped = pipeline.frames_skipped(),
        "gesture-pilot-daemon stopped"
    );

    Ok(())
}
