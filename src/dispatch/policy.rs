//! Dispatch mode and error reporting policy.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::VcpError;

/// When processors run relative to frame arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Processors run as soon as the frame arrives.
    #[default]
    Immediate,
    /// Processors run when the host drains the queue.
    Deferred,
}

/// Callback receiving contained dispatch errors.
pub type ErrorCallback = Arc<dyn Fn(&VcpError) + Send + Sync>;

/// Where malformed frames and processor failures are reported.
///
/// Dispatch never propagates these errors; the sink only decides whether
/// anyone hears about them.
#[derive(Clone, Default)]
pub enum ErrorSink {
    /// Drop the error. Best-effort streaming.
    #[default]
    Silent,
    /// Emit a `tracing` warning.
    Log,
    /// Hand the error to a callback.
    Callback(ErrorCallback),
}

impl ErrorSink {
    /// Build a callback sink.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&VcpError) + Send + Sync + 'static,
    {
        ErrorSink::Callback(Arc::new(f))
    }

    /// Report one contained error.
    pub fn report(&self, error: &VcpError) {
        match self {
            ErrorSink::Silent => tracing::trace!(%error, "Dropped dispatch error"),
            ErrorSink::Log => tracing::warn!(%error, "Dispatch error"),
            ErrorSink::Callback(callback) => callback(error),
        }
    }
}

impl fmt::Debug for ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSink::Silent => f.write_str("Silent"),
            ErrorSink::Log => f.write_str("Log"),
            ErrorSink::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}
