//! Connection manager - lifecycle of the single outbound connection.
//!
//! The manager runs as one tokio task. It loops through:
//! 1. `Connecting`: ask the [`Connector`] for a transport
//! 2. `Open`: send the handshake, then pass every inbound message to the
//!    frame callback in arrival order
//! 3. `Closed`: on error or remote close, close the transport, wait the
//!    retry delay, start over
//!
//! Because one task owns the whole cycle there is never more than one
//! connect attempt or pending reconnect at a time. Connect attempts are
//! bounded by a timeout. A [`ConnectionHandle`]
//! talks to the task over a command channel and observes state through a
//! `watch` channel.

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{ConnectionState, Connector, RetryPolicy, Transport, WebSocketConnector};
use crate::api::{ClientRole, Handshake};
use crate::codec::JsonCodec;
use crate::error::{Result, VcpError};

/// Default bound on a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives every inbound wire message, uninterpreted.
pub type FrameCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug)]
enum Command {
    Send(String),
    Retry,
    Shutdown,
}

/// Why the task left a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Reconnect,
    Shutdown,
}

/// Publishes `Closed` when the connection task ends, unwinding included.
struct StateGuard(watch::Sender<ConnectionState>);

impl Deref for StateGuard {
    type Target = watch::Sender<ConnectionState>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Drop for StateGuard {
    fn drop(&mut self) {
        self.0.send_replace(ConnectionState::Closed);
    }
}

/// Owns the connection lifecycle for one URL.
pub struct ConnectionManager {
    url: String,
    connector: Arc<dyn Connector>,
    retry: RetryPolicy,
    connect_timeout: Duration,
    role: ClientRole,
    on_frame: FrameCallback,
}

impl ConnectionManager {
    /// Create a manager that connects over WebSocket with default retry.
    pub fn new(url: impl Into<String>, on_frame: FrameCallback) -> Self {
        Self {
            url: url.into(),
            connector: Arc::new(WebSocketConnector),
            retry: RetryPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            role: ClientRole::Sink,
            on_frame,
        }
    }

    /// Use a different transport factory.
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Set how reconnects are scheduled.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bound each connect attempt. An attempt that runs out counts as a
    /// failed connect.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Role announced in the handshake.
    pub fn with_role(mut self, role: ClientRole) -> Self {
        self.role = role;
        self
    }

    /// Start the connection task and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(self) -> ConnectionHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Closed);

        let task = tokio::spawn(self.run(commands_rx, state_tx));

        ConnectionHandle {
            commands: commands_tx,
            state: state_rx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Main lifecycle loop.
    async fn run(
        self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        state: watch::Sender<ConnectionState>,
    ) {
        let state = StateGuard(state);
        let mut failures: u32 = 0;

        loop {
            state.send_replace(ConnectionState::Connecting);
            tracing::debug!(url = %self.url, "Connecting");

            let exit = match self.connect(&mut commands).await {
                Err(exit) => exit,
                Ok(Ok(mut transport)) => {
                    let exit = self
                        .serve(transport.as_mut(), &mut commands, &state, &mut failures)
                        .await;
                    transport.close().await;
                    exit
                }
                Ok(Err(e)) => {
                    tracing::warn!(url = %self.url, error = %e, "Connect failed");
                    Exit::Reconnect
                }
            };
            state.send_replace(ConnectionState::Closed);

            if exit == Exit::Shutdown {
                break;
            }

            failures = failures.saturating_add(1);
            let Some(delay) = self.retry.delay_for(failures) else {
                tracing::error!(url = %self.url, failures, "Giving up reconnecting");
                break;
            };

            tracing::info!(
                url = %self.url,
                delay_ms = delay.as_millis() as u64,
                attempt = failures,
                "Reconnect scheduled"
            );
            if self.wait(delay, &mut commands).await == Exit::Shutdown {
                break;
            }
        }

        tracing::debug!(url = %self.url, "Connection task stopped");
    }

    /// Run one bounded connect attempt.
    ///
    /// A shutdown or retry command abandons the attempt and is returned as
    /// the exit.
    async fn connect(
        &self,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> std::result::Result<Result<Box<dyn Transport>>, Exit> {
        let connecting =
            tokio::time::timeout(self.connect_timeout, self.connector.connect(&self.url));
        tokio::pin!(connecting);

        loop {
            tokio::select! {
                result = &mut connecting => {
                    return Ok(result.unwrap_or_else(|_| {
                        Err(VcpError::ConnectTimeout(self.connect_timeout))
                    }));
                }
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => return Err(Exit::Shutdown),
                    Some(Command::Retry) => {
                        tracing::info!(url = %self.url, "Abandoning connect attempt on request");
                        return Err(Exit::Reconnect);
                    }
                    Some(Command::Send(_)) => {
                        tracing::debug!("Dropping outbound message, connection not open");
                    }
                },
            }
        }
    }

    /// Handshake, then pump inbound messages until the transport fails or a
    /// command ends the session.
    async fn serve(
        &self,
        transport: &mut dyn Transport,
        commands: &mut mpsc::UnboundedReceiver<Command>,
        state: &watch::Sender<ConnectionState>,
        failures: &mut u32,
    ) -> Exit {
        let handshake = match JsonCodec::encode(&Handshake::new(self.role)) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode handshake");
                return Exit::Reconnect;
            }
        };
        if let Err(e) = transport.send(handshake).await {
            tracing::warn!(url = %self.url, error = %e, "Handshake send failed");
            return Exit::Reconnect;
        }

        *failures = 0;
        state.send_replace(ConnectionState::Open);
        tracing::info!(url = %self.url, role = ?self.role, "Connection open");

        loop {
            tokio::select! {
                inbound = transport.recv() => match inbound {
                    Some(Ok(text)) => (self.on_frame)(&text),
                    Some(Err(e)) => {
                        tracing::warn!(url = %self.url, error = %e, "Transport error");
                        return Exit::Reconnect;
                    }
                    None => {
                        tracing::info!(url = %self.url, "Connection closed by peer");
                        return Exit::Reconnect;
                    }
                },
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => return Exit::Shutdown,
                    Some(Command::Retry) => {
                        tracing::info!(url = %self.url, "Reconnect requested");
                        return Exit::Reconnect;
                    }
                    Some(Command::Send(text)) => {
                        if let Err(e) = transport.send(text).await {
                            tracing::warn!(url = %self.url, error = %e, "Send failed");
                            return Exit::Reconnect;
                        }
                    }
                },
            }
        }
    }

    /// Sleep out the retry delay. Retry requests during the wait coalesce
    /// into the pending reconnect.
    async fn wait(
        &self,
        delay: Duration,
        commands: &mut mpsc::UnboundedReceiver<Command>,
    ) -> Exit {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return Exit::Reconnect,
                command = commands.recv() => match command {
                    None | Some(Command::Shutdown) => return Exit::Shutdown,
                    Some(Command::Retry) => {
                        tracing::debug!("Reconnect already scheduled");
                    }
                    Some(Command::Send(_)) => {
                        tracing::debug!("Dropping outbound message, connection not open");
                    }
                },
            }
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("url", &self.url)
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Handle to a running connection task.
///
/// Dropping every handle stops the task.
#[derive(Debug)]
pub struct ConnectionHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionHandle {
    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Wait until the connection reaches `target`.
    ///
    /// Fails with [`VcpError::ConnectionClosed`] if the task stops first.
    pub async fn wait_for_state(&self, target: ConnectionState) -> Result<()> {
        let mut state = self.state.clone();
        state
            .wait_for(|current| *current == target)
            .await
            .map(|_| ())
            .map_err(|_| VcpError::ConnectionClosed)
    }

    /// Queue a text message for the live transport (fire-and-forget).
    pub fn send_text(&self, text: impl Into<String>) -> Result<()> {
        if !self.is_open() {
            return Err(VcpError::NotConnected);
        }
        self.commands
            .send(Command::Send(text.into()))
            .map_err(|_| VcpError::ConnectionClosed)
    }

    /// Close the live transport, or abandon an in-flight connect attempt,
    /// and reconnect after the retry delay.
    ///
    /// Coalesces with any reconnect already pending.
    pub fn retry(&self) -> Result<()> {
        self.commands
            .send(Command::Retry)
            .map_err(|_| VcpError::ConnectionClosed)
    }

    /// Stop the task, closing the transport if one is live.
    pub async fn shutdown(&self) -> Result<()> {
        let _ = self.commands.send(Command::Shutdown);

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Connection task failed");
                return Err(VcpError::ConnectionClosed);
            }
        }
        Ok(())
    }
}
