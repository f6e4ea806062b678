//! Processor registry for routing frames by message type.
//!
//! The registry maps each [`MessageType`] to the processors interested in it,
//! in registration order. It is append-only: there is no removal.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vcp_client::api::{MessageType, RawFrame};
//! use vcp_client::processor::{FnProcessor, ProcessorRegistry};
//!
//! let mut registry = ProcessorRegistry::new();
//! registry.register(Arc::new(FnProcessor::new(
//!     [MessageType::HEAD_POSE],
//!     |_frame: &RawFrame| Ok(()),
//! )));
//!
//! assert_eq!(registry.lookup(&MessageType::HEAD_POSE).len(), 1);
//! assert!(registry.lookup(&MessageType::FULL_BODY).is_empty());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use super::Processor;
use crate::api::MessageType;

/// What to do when the same processor is registered twice for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Append again; the processor is invoked once per registration.
    #[default]
    Allow,
    /// Skip types under which the same `Arc` is already registered.
    Ignore,
}

/// Registry mapping message types to ordered processors.
#[derive(Default)]
pub struct ProcessorRegistry {
    /// Processors by type, in registration order.
    processors: HashMap<MessageType, Vec<Arc<dyn Processor>>>,
    duplicates: DuplicatePolicy,
}

impl ProcessorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given duplicate policy.
    pub fn with_policy(duplicates: DuplicatePolicy) -> Self {
        Self {
            processors: HashMap::new(),
            duplicates,
        }
    }

    /// Register a processor under every type it supports.
    pub fn register(&mut self, processor: Arc<dyn Processor>) {
        for message_type in processor.supported_types() {
            let entry = self.processors.entry(message_type).or_default();

            if self.duplicates == DuplicatePolicy::Ignore
                && entry.iter().any(|p| same_processor(p, &processor))
            {
                continue;
            }
            entry.push(processor.clone());
        }
    }

    /// Get the processors registered for `message_type`, in order.
    ///
    /// Returns an empty slice if none are registered.
    pub fn lookup(&self, message_type: &MessageType) -> &[Arc<dyn Processor>] {
        self.processors
            .get(message_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Types that have at least one processor.
    pub fn types(&self) -> impl Iterator<Item = &MessageType> {
        self.processors.keys()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Current duplicate policy.
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .processors
            .iter()
            .map(|(t, ps)| (t.as_str(), ps.len()))
            .collect();
        f.debug_struct("ProcessorRegistry")
            .field("processors", &counts)
            .field("duplicates", &self.duplicates)
            .finish()
    }
}

/// Compare by data pointer only; vtable pointers may differ across codegen units.
fn same_processor(a: &Arc<dyn Processor>, b: &Arc<dyn Processor>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawFrame;
    use crate::error::Result;

    struct Stub {
        types: Vec<MessageType>,
    }

    impl Processor for Stub {
        fn process(&self, _frame: &RawFrame) -> Result<()> {
            Ok(())
        }

        fn supported_types(&self) -> Vec<MessageType> {
            self.types.clone()
        }
    }

    fn stub(types: &[MessageType]) -> Arc<dyn Processor> {
        Arc::new(Stub {
            types: types.to_vec(),
        })
    }

    fn pointers(registry: &ProcessorRegistry, t: &MessageType) -> Vec<*const ()> {
        registry
            .lookup(t)
            .iter()
            .map(|p| Arc::as_ptr(p) as *const ())
            .collect()
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = ProcessorRegistry::new();
        let p1 = stub(&[MessageType::HEAD_POSE]);
        let p2 = stub(&[MessageType::HEAD_POSE]);
        let p3 = stub(&[MessageType::HEAD_POSE]);

        registry.register(p1.clone());
        registry.register(p2.clone());
        registry.register(p3.clone());

        let expected: Vec<*const ()> = [&p1, &p2, &p3]
            .iter()
            .map(|p| Arc::as_ptr(p) as *const ())
            .collect();
        assert_eq!(pointers(&registry, &MessageType::HEAD_POSE), expected);
    }

    #[test]
    fn test_processor_under_multiple_types() {
        let mut registry = ProcessorRegistry::new();
        registry.register(stub(&[MessageType::HEAD_POSE, MessageType::FULL_BODY]));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&MessageType::HEAD_POSE).len(), 1);
        assert_eq!(registry.lookup(&MessageType::FULL_BODY).len(), 1);
    }

    #[test]
    fn test_lookup_unknown_is_empty() {
        let registry = ProcessorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(&MessageType::new("nope")).is_empty());
    }

    #[test]
    fn test_duplicates_allowed_by_default() {
        let mut registry = ProcessorRegistry::new();
        let p = stub(&[MessageType::BUST]);

        registry.register(p.clone());
        registry.register(p);

        assert_eq!(registry.duplicate_policy(), DuplicatePolicy::Allow);
        assert_eq!(registry.lookup(&MessageType::BUST).len(), 2);
    }

    #[test]
    fn test_duplicates_ignored_when_configured() {
        let mut registry = ProcessorRegistry::with_policy(DuplicatePolicy::Ignore);
        let p = stub(&[MessageType::BUST]);
        let q = stub(&[MessageType::BUST]);

        registry.register(p.clone());
        registry.register(q);
        registry.register(p);

        assert_eq!(registry.lookup(&MessageType::BUST).len(), 2);
    }

    #[test]
    fn test_processor_without_types_registers_nothing() {
        let mut registry = ProcessorRegistry::new();
        registry.register(stub(&[]));
        assert!(registry.is_empty());
    }
}
