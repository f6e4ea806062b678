//! Message router - parse, look up, dispatch.
//!
//! The router is the frame callback of the connection manager. For every
//! inbound text message it:
//! 1. Optionally traces the raw text (debug toggle)
//! 2. Parses it into a [`RawFrame`] (failures go to the error sink)
//! 3. Looks up processors for the frame's type, then the [`MessageType::ANY`] ones
//! 4. Invokes them now ([`DispatchMode::Immediate`]) or queues one thunk per
//!    processor ([`DispatchMode::Deferred`])
//!
//! Each processor call is isolated: a failing or panicking processor is
//! reported and the remaining processors still see the frame.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{DispatchMode, DispatchQueue, ErrorSink};
use crate::api::{MessageType, RawFrame};
use crate::error::VcpError;
use crate::processor::{DuplicatePolicy, Processor, ProcessorRegistry};

/// Routes inbound frames to registered processors.
#[derive(Debug)]
pub struct MessageRouter {
    registry: RwLock<ProcessorRegistry>,
    queue: DispatchQueue,
    deferred: AtomicBool,
    debug: AtomicBool,
    errors: ErrorSink,
}

impl MessageRouter {
    /// Create a router with an empty registry.
    pub fn new(mode: DispatchMode) -> Self {
        Self::with_registry(ProcessorRegistry::new(), mode)
    }

    /// Create a router around an existing registry.
    pub fn with_registry(registry: ProcessorRegistry, mode: DispatchMode) -> Self {
        Self {
            registry: RwLock::new(registry),
            queue: DispatchQueue::new(),
            deferred: AtomicBool::new(mode == DispatchMode::Deferred),
            debug: AtomicBool::new(false),
            errors: ErrorSink::default(),
        }
    }

    /// Set where contained errors are reported.
    pub fn with_error_sink(mut self, errors: ErrorSink) -> Self {
        self.errors = errors;
        self
    }

    /// Register a processor under all of its supported types.
    pub fn register(&self, processor: Arc<dyn Processor>) {
        let types = processor.supported_types();
        self.registry.write().register(processor);
        tracing::debug!(?types, "Registered processor");
    }

    /// Processors for `message_type`, in registration order.
    pub fn lookup(&self, message_type: &MessageType) -> Vec<Arc<dyn Processor>> {
        self.registry.read().lookup(message_type).to_vec()
    }

    /// Duplicate policy of the underlying registry.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.registry.read().duplicate_policy()
    }

    /// Switch dispatch mode. Already queued thunks are unaffected.
    pub fn set_dispatch_mode(&self, mode: DispatchMode) {
        self.deferred
            .store(mode == DispatchMode::Deferred, Ordering::Release);
    }

    /// Current dispatch mode.
    pub fn dispatch_mode(&self) -> DispatchMode {
        if self.deferred.load(Ordering::Acquire) {
            DispatchMode::Deferred
        } else {
            DispatchMode::Immediate
        }
    }

    /// Toggle tracing of raw inbound text.
    pub fn set_debug(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Whether raw frames are traced.
    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Handle one inbound wire message. Never fails.
    pub fn on_message(&self, raw: &str) {
        if self.is_debug() {
            tracing::debug!(target: "vcp_client::raw", frame = raw, "Inbound frame");
        }

        match RawFrame::parse(raw) {
            Ok(frame) => self.route(frame),
            Err(e) => {
                let error = match e {
                    VcpError::MalformedFrame(_) => e,
                    other => VcpError::MalformedFrame(other.to_string()),
                };
                self.errors.report(&error);
            }
        }
    }

    /// Dispatch an already parsed frame.
    pub fn route(&self, frame: RawFrame) {
        let processors = self.matching(frame.message_type());
        if processors.is_empty() {
            return;
        }

        if self.dispatch_mode() == DispatchMode::Deferred {
            let frame = Arc::new(frame);
            for processor in processors {
                let frame = frame.clone();
                let errors = self.errors.clone();
                self.queue
                    .enqueue(move || invoke(processor.as_ref(), &frame, &errors));
            }
        } else {
            for processor in &processors {
                invoke(processor.as_ref(), &frame, &self.errors);
            }
        }
    }

    /// Run every deferred thunk, including ones queued while draining.
    ///
    /// Safe to call in immediate mode or with an empty queue. Returns the
    /// number of processor invocations run.
    pub fn drain_deferred(&self) -> usize {
        self.queue.drain_all()
    }

    /// Number of queued processor invocations.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Handle to the deferred queue.
    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// Type-specific processors followed by wildcard ones. The registry lock
    /// is released before any processor runs.
    fn matching(&self, message_type: &MessageType) -> Vec<Arc<dyn Processor>> {
        let registry = self.registry.read();
        let mut processors = registry.lookup(message_type).to_vec();
        if !message_type.is_any() {
            processors.extend_from_slice(registry.lookup(&MessageType::ANY));
        }
        processors
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new(DispatchMode::default())
    }
}

/// Run one processor. Errors and panics are reported, never propagated.
fn invoke(processor: &dyn Processor, frame: &RawFrame, errors: &ErrorSink) {
    let error = match panic::catch_unwind(AssertUnwindSafe(|| processor.process(frame))) {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(payload) => VcpError::processor(format!("panicked: {}", panic_message(&*payload))),
    };
    errors.report(&VcpError::processor_failed(
        frame.message_type().clone(),
        error,
    ));
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
