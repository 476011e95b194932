//! Unix domain socket server for IPC
//!
//! Clients submit landmark frames and query status. Subscribed clients
//! additionally receive every control event the pipeline emits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::events::ControlEvent;
use crate::pipeline::Frame;

use super::protocol::{DaemonStatus, Notification, Outbound, Request, Response};

/// Largest accepted message body
const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: UnixListener,
    state: Arc<RwLock<ServerState>>,
    shutdown_tx: broadcast::Sender<()>,
    /// Frames received from clients, consumed by the pipeline
    frame_tx: mpsc::Sender<Frame>,
    /// Pipeline output, fanned out to subscribed clients
    event_tx: broadcast::Sender<ControlEvent>,
}

/// Shared server state
struct ServerState {
    status: DaemonStatus,
    start_time: std::time::Instant,
}

/// Handles a client task needs
#[derive(Clone)]
struct ClientContext {
    state: Arc<RwLock<ServerState>>,
    frame_tx: mpsc::Sender<Frame>,
    event_tx: broadcast::Sender<ControlEvent>,
}

impl Server {
    /// Create a new IPC server
    pub fn new(
        socket_path: &Path,
        frame_tx: mpsc::Sender<Frame>,
        event_tx: broadcast::Sender<ControlEvent>,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let state = Arc::new(RwLock::new(ServerState {
            status: DaemonStatus::default(),
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            state,
            shutdown_tx,
            frame_tx,
            event_tx,
        })
    }

    /// Fold a pipeline event into the status snapshot
    pub async fn apply_event(&self, event: &ControlEvent) {
        let mut state = self.state.write().await;
        match event {
            ControlEvent::GestureChanged { gesture } => {
                if state.status.gesture != *gesture {
                    info!(from = %state.status.gesture, to = %gesture, "IPC server: gesture updated");
                }
                state.status.gesture = *gesture;
            }
            ControlEvent::FistChanged { closed } => state.status.fist_closed = *closed,
            ControlEvent::OrientationChanged { .. } | ControlEvent::Rotate { .. } => {}
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let context = ClientContext {
            state: Arc::clone(&self.state),
            frame_tx: self.frame_tx.clone(),
            event_tx: self.event_tx.clone(),
        };

        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let context = context.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, context) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    async fn handle_client(stream: UnixStream, context: ClientContext) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::channel::<Outbound>(64);
        let writer_task = tokio::spawn(Self::write_loop(writer, out_rx));
        let mut forwarder: Option<JoinHandle<()>> = None;

        let result = async {
            while let Some(body) = Self::read_message(&mut reader).await? {
                let response = match serde_json::from_slice::<Request>(&body) {
                    Ok(request) => {
                        debug!(?request, "received request");
                        let (response, subscribe) = Self::process_request(request, &context).await;
                        if subscribe && forwarder.is_none() {
                            debug!("client subscribed to notifications");
                            forwarder = Some(tokio::spawn(Self::forward_events(
                                context.event_tx.subscribe(),
                                out_tx.clone(),
                            )));
                        }
                        response
                    }
                    Err(e) => {
                        warn!(%e, "malformed request");
                        Response::error("bad_request", e.to_string())
                    }
                };

                if out_tx.send(Outbound::Response(response)).await.is_err() {
                    break;
                }
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;

        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        drop(out_tx);
        writer_task.await.context("client writer panicked")??;

        result
    }

    /// Read one length-prefixed message body. `None` on clean disconnect
    /// or an oversized message.
    async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("client disconnected");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_MESSAGE_LEN {
            warn!(len, "message too large, disconnecting");
            return Ok(None);
        }

        let mut body = vec![0u8; len];
        reader.read_exact(&mut body).await?;
        Ok(Some(body))
    }

    /// Drain the outbound queue onto the socket
    async fn write_loop(
        mut writer: OwnedWriteHalf,
        mut out_rx: mpsc::Receiver<Outbound>,
    ) -> Result<()> {
        while let Some(msg) = out_rx.recv().await {
            Self::send_message(&mut writer, &msg).await?;
        }
        Ok(())
    }

    /// Forward pipeline events to one subscribed client
    async fn forward_events(
        mut event_rx: broadcast::Receiver<ControlEvent>,
        out_tx: mpsc::Sender<Outbound>,
    ) {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    let msg = Outbound::Notification(Notification::ControlEvent { event });
                    if out_tx.send(msg).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<W, T>(stream: &mut W, msg: &T) -> Result<()>
    where
        W: AsyncWrite + Unpin,
        T: serde::Serialize,
    {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        stream.write_all(&msg_len).await?;
        stream.write_all(&msg_bytes).await?;

        Ok(())
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(request: Request, context: &ClientContext) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let state = context.state.read().await;
                let mut status = state.status.clone();
                status.uptime_secs = state.start_time.elapsed().as_secs();
                (Response::Status(status), false)
            }

            Request::SubmitFrame { frame } => {
                context.state.write().await.status.frames_received += 1;
                match context.frame_tx.send(frame.into_frame()).await {
                    Ok(()) => (Response::FrameAccepted, false),
                    Err(_) => (
                        Response::error("pipeline_closed", "gesture pipeline is not running"),
                        false,
                    ),
                }
            }

            Request::Subscribe => (Response::Subscribed, true),
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}
