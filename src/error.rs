//! Error types for vcp-client.

use thiserror::Error;

use crate::api::MessageType;

/// Main error type for all VCP client operations.
#[derive(Debug, Error)]
pub enum VcpError {
    /// I/O error on the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket transport error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Inbound text could not be turned into a frame.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// A processor returned an error while handling a frame.
    #[error("Processor for '{message_type}' failed: {source}")]
    ProcessorFailed {
        message_type: MessageType,
        #[source]
        source: Box<VcpError>,
    },

    /// Error raised from inside a processor.
    #[error("Processor error: {0}")]
    Processor(String),

    /// Outbound send attempted while the connection is not open.
    #[error("Not connected")]
    NotConnected,

    /// A connect attempt did not complete in time.
    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// Connection task has stopped.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VcpError {
    /// Wrap an error returned by a processor for `message_type`.
    pub fn processor_failed(message_type: MessageType, source: VcpError) -> Self {
        VcpError::ProcessorFailed {
            message_type,
            source: Box::new(source),
        }
    }

    /// Create a processor error from any displayable reason.
    pub fn processor(reason: impl Into<String>) -> Self {
        VcpError::Processor(reason.into())
    }
}

/// Result type alias using VcpError.
pub type Result<T> = std::result::Result<T, VcpError>;
