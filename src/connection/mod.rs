//! Connection module - the single outbound connection to the VCP server.
//!
//! - [`ConnectionManager`] / [`ConnectionHandle`] - lifecycle task and its handle
//! - [`Connector`] / [`Transport`] - transport seam, WebSocket by default
//! - [`RetryPolicy`] - reconnect scheduling
//! - [`ConnectionState`] - closed / connecting / open

mod manager;
#[cfg(test)]
pub(crate) mod mock;
mod retry;
mod state;
mod transport;

pub use manager::{ConnectionHandle, ConnectionManager, FrameCallback, DEFAULT_CONNECT_TIMEOUT};
pub use retry::{RetryPolicy, DEFAULT_RETRY_DELAY};
pub use state::ConnectionState;
pub use transport::{BoxFuture, Connector, Transport, WebSocketConnector, WebSocketTransport};
