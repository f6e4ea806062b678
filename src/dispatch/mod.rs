//! Dispatch module - routing frames to processors.
//!
//! - [`MessageRouter`] - parses inbound text and fans frames out
//! - [`DispatchQueue`] - FIFO of deferred processor invocations
//! - [`DispatchMode`] / [`ErrorSink`] - dispatch and error policies
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vcp_client::api::{MessageType, RawFrame};
//! use vcp_client::dispatch::{DispatchMode, MessageRouter};
//! use vcp_client::processor::FnProcessor;
//!
//! let router = MessageRouter::new(DispatchMode::Deferred);
//! router.register(Arc::new(FnProcessor::new(
//!     [MessageType::HEAD_POSE],
//!     |frame: &RawFrame| {
//!         println!("{:?}", frame.get("rotation"));
//!         Ok(())
//!     },
//! )));
//!
//! router.on_message(r#"{"type":"headPoseAPI","rotation":{"yaw":1.0}}"#);
//! assert_eq!(router.pending(), 1);
//!
//! // Once per tick:
//! router.drain_deferred();
//! ```

mod policy;
mod queue;
mod router;

pub use policy::{DispatchMode, ErrorCallback, ErrorSink};
pub use queue::{DispatchQueue, Thunk};
pub use router::MessageRouter;
