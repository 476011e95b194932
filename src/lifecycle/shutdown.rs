//! Signal handling for graceful shutdown

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal {
    sigterm: SignalKind,
    sigint: SignalKind,
}

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self {
            sigterm: SignalKind::terminate(),
            sigint: SignalKind::interrupt(),
        }
    }

    /// Wait for a shutdown signal.
    ///
    /// Fails only if the signal handlers cannot be registered, in which
    /// case the daemon could never be stopped cleanly.
    pub async fn wait(&self) -> std::io::Result<()> {
        let mut sigterm = signal(self.sigterm)?;
        let mut sigint = signal(self.sigint)?;

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }

        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
