//! Sink client builder and handle.
//!
//! The [`SinkClientBuilder`] provides a fluent API for configuring processors
//! and policies. [`SinkClient`] wires a [`MessageRouter`] to a
//! [`ConnectionManager`]:
//! 1. Validate configuration
//! 2. Register processors with the router
//! 3. Spawn the connection task, using the router as its frame callback
//!
//! # Example
//!
//! ```no_run
//! use vcp_client::api::HeadPose;
//! use vcp_client::dispatch::DispatchMode;
//! use vcp_client::SinkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SinkClient::builder("ws://localhost:8080")
//!         .on(|pose: HeadPose| {
//!             println!("yaw = {}", pose.rotation.yaw);
//!             Ok(())
//!         })
//!         .dispatch_mode(DispatchMode::Deferred)
//!         .start()
//!         .await?;
//!
//!     let mut tick = tokio::time::interval(std::time::Duration::from_millis(16));
//!     loop {
//!         tick.tick().await;
//!         client.process_queue();
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::api::{ApiMessage, ClientRole, MessageType, RawFrame, LEGACY_REQUEST};
use crate::config::SinkConfig;
use crate::connection::{
    ConnectionHandle, ConnectionManager, ConnectionState, Connector, FrameCallback, RetryPolicy,
};
use crate::dispatch::{DispatchMode, ErrorSink, MessageRouter};
use crate::error::Result;
use crate::processor::{ApiSink, DuplicatePolicy, FnProcessor, Processor, ProcessorRegistry};

/// Builder for configuring and starting a sink client.
pub struct SinkClientBuilder {
    config: SinkConfig,
    processors: Vec<Arc<dyn Processor>>,
    error_sink: ErrorSink,
    connector: Option<Arc<dyn Connector>>,
}

impl SinkClientBuilder {
    /// Create a builder with default settings for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::from_config(SinkConfig::new(url))
    }

    /// Create a builder from a loaded configuration.
    pub fn from_config(config: SinkConfig) -> Self {
        Self {
            config,
            processors: Vec::new(),
            error_sink: ErrorSink::default(),
            connector: None,
        }
    }

    /// Register a processor under all of its supported types.
    pub fn processor(mut self, processor: Arc<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Register a typed handler for `T`'s message type.
    pub fn on<T, F>(self, handler: F) -> Self
    where
        T: ApiMessage + DeserializeOwned + 'static,
        F: Fn(T) -> Result<()> + Send + Sync + 'static,
    {
        self.processor(Arc::new(ApiSink::new(handler)))
    }

    /// Register a raw-frame handler for the given types.
    ///
    /// Use [`MessageType::ANY`] to see every frame.
    pub fn on_raw<F>(self, types: impl IntoIterator<Item = MessageType>, handler: F) -> Self
    where
        F: Fn(&RawFrame) -> Result<()> + Send + Sync + 'static,
    {
        self.processor(Arc::new(FnProcessor::new(types, handler)))
    }

    /// Default: [`DispatchMode::Immediate`]
    pub fn dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.config.dispatch_mode = mode;
        self
    }

    /// Set how reconnects are scheduled.
    ///
    /// Default: fixed 5 seconds, unlimited
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    /// Shorthand for a fixed retry delay with unlimited attempts.
    pub fn retry_delay(self, delay: Duration) -> Self {
        self.retry_policy(RetryPolicy::fixed(delay))
    }

    /// Bound each connect attempt.
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Trace every raw inbound frame.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Role announced in the handshake.
    ///
    /// Default: [`ClientRole::Sink`]
    pub fn role(mut self, role: ClientRole) -> Self {
        self.config.role = role;
        self
    }

    /// Where malformed frames and processor failures are reported.
    ///
    /// Default: [`ErrorSink::Silent`]
    pub fn error_sink(mut self, sink: ErrorSink) -> Self {
        self.error_sink = sink;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    /// Replace the WebSocket transport.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Build and start the client.
    ///
    /// Returns as soon as the connection task is running; the connection
    /// itself opens in the background. Use
    /// [`SinkClient::wait_until_open`] to wait for it.
    pub async fn start(self) -> Result<SinkClient> {
        self.config.validate()?;

        let mut registry = ProcessorRegistry::with_policy(self.config.duplicate_policy);
        for processor in self.processors {
            registry.register(processor);
        }

        let router = Arc::new(
            MessageRouter::with_registry(registry, self.config.dispatch_mode)
                .with_error_sink(self.error_sink),
        );
        router.set_debug(self.config.debug);

        let frames = router.clone();
        let on_frame: FrameCallback = Arc::new(move |text: &str| frames.on_message(text));

        let mut manager = ConnectionManager::new(self.config.url.clone(), on_frame)
            .with_retry_policy(self.config.retry.clone())
            .with_connect_timeout(self.config.connect_timeout)
            .with_role(self.config.role);
        if let Some(connector) = self.connector {
            manager = manager.with_connector(connector);
        }

        tracing::info!(
            url = %self.config.url,
            mode = ?self.config.dispatch_mode,
            "Starting sink client"
        );
        let connection = manager.open();

        Ok(SinkClient { router, connection })
    }
}

impl std::fmt::Debug for SinkClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SinkClientBuilder")
            .field("config", &self.config)
            .field("processors", &self.processors.len())
            .field("error_sink", &self.error_sink)
            .finish_non_exhaustive()
    }
}

/// A running sink client.
///
/// In deferred mode, call [`process_queue`](Self::process_queue) once per
/// host tick. Everything else runs in the background.
#[derive(Debug)]
pub struct SinkClient {
    router: Arc<MessageRouter>,
    connection: ConnectionHandle,
}

impl SinkClient {
    /// Create a new client builder.
    pub fn builder(url: impl Into<String>) -> SinkClientBuilder {
        SinkClientBuilder::new(url)
    }

    /// Register a processor at runtime. Frames already routed are unaffected.
    pub fn register(&self, processor: Arc<dyn Processor>) {
        self.router.register(processor);
    }

    /// Switch dispatch mode. Already queued work stays queued.
    pub fn set_dispatch_mode(&self, mode: DispatchMode) {
        self.router.set_dispatch_mode(mode);
    }

    pub fn dispatch_mode(&self) -> DispatchMode {
        self.router.dispatch_mode()
    }

    /// Run all deferred processor calls, including ones queued meanwhile.
    ///
    /// Returns how many ran.
    pub fn process_queue(&self) -> usize {
        self.router.drain_deferred()
    }

    /// Number of deferred processor calls waiting.
    pub fn pending(&self) -> usize {
        self.router.pending()
    }

    pub fn set_debug(&self, enabled: bool) {
        self.router.set_debug(enabled);
    }

    /// The router behind this client.
    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_open()
    }

    /// Wait until the connection is open and the handshake has been sent.
    pub async fn wait_until_open(&self) -> Result<()> {
        self.connection.wait_for_state(ConnectionState::Open).await
    }

    /// Drop the current connection and reconnect after the retry delay.
    pub fn retry(&self) -> Result<()> {
        self.connection.retry()
    }

    /// Send the legacy pull request.
    #[deprecated(note = "VCP servers push frames; the pull request is ignored")]
    pub fn manual_request(&self) -> Result<()> {
        self.connection.send_text(LEGACY_REQUEST)
    }

    /// Close the connection and stop reconnecting.
    ///
    /// Queued deferred work is kept; call [`process_queue`](Self::process_queue)
    /// to flush it.
    pub async fn shutdown(&self) -> Result<()> {
        self.connection.shutdown().await
    }
}
