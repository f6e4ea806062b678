//! Processor module - frame consumers and their registry.
//!
//! Provides:
//! - [`Processor`] - the consumer trait
//! - [`ProcessorRegistry`] - maps message types to ordered processors
//! - [`ApiSink`] / [`FnProcessor`] - ready-made processors
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vcp_client::api::HeadPose;
//! use vcp_client::processor::{ApiSink, ProcessorRegistry};
//!
//! let mut registry = ProcessorRegistry::new();
//! registry.register(Arc::new(ApiSink::new(|pose: HeadPose| {
//!     println!("yaw = {}", pose.rotation.yaw);
//!     Ok(())
//! })));
//! ```

mod registry;
mod sink;

pub use registry::{DuplicatePolicy, ProcessorRegistry};
pub use sink::{ApiSink, FnProcessor};

use crate::api::{MessageType, RawFrame};
use crate::error::Result;

/// A consumer of frames of one or more message types.
pub trait Processor: Send + Sync + 'static {
    /// Handle one frame. Errors are reported to the router's error sink and
    /// do not stop delivery to other processors.
    fn process(&self, frame: &RawFrame) -> Result<()>;

    /// Types this processor wants. Read once, at registration.
    fn supported_types(&self) -> Vec<MessageType>;
}
