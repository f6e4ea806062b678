//! Connection lifecycle state.

use std::fmt;

/// State of the single outbound connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport. Either not started, waiting to retry, or stopped.
    #[default]
    Closed,
    /// A connect attempt is in flight.
    Connecting,
    /// Transport is ready and the handshake has been sent.
    Open,
}

impl ConnectionState {
    #[inline]
    pub fn is_open(self) -> bool {
        self == ConnectionState::Open
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
        };
        f.write_str(name)
    }
}
