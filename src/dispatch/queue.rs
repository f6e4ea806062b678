//! FIFO of deferred work.
//!
//! Deferred dispatch turns every (processor, frame) pair into a thunk and
//! parks it here until the host drains the queue, typically once per render
//! tick.
//!
//! The queue is a cheaply cloneable handle. A running thunk may enqueue into
//! the same queue; such thunks run in the same [`DispatchQueue::drain_all`]
//! call, after everything that was already queued.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// A deferred unit of work.
pub type Thunk = Box<dyn FnOnce() + Send + 'static>;

/// Shared FIFO of thunks.
#[derive(Clone, Default)]
pub struct DispatchQueue {
    inner: Arc<Mutex<VecDeque<Thunk>>>,
}

impl DispatchQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a thunk to the tail.
    pub fn enqueue<F>(&self, thunk: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.lock().push_back(Box::new(thunk));
    }

    /// Run thunks from the head until the queue is empty.
    ///
    /// The lock is released while each thunk runs. Failures inside a thunk
    /// are not caught here. Returns the number of thunks run.
    pub fn drain_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.inner.lock().pop_front();
            let Some(thunk) = next else {
                return ran;
            };
            thunk();
            ran += 1;
        }
    }

    /// Number of queued thunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl std::fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Thunk) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |n: u32| -> Thunk {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(n))
        };
        (log, make)
    }

    #[test]
    fn test_drain_runs_in_fifo_order() {
        let queue = DispatchQueue::new();
        let (log, make) = recorder();

        queue.enqueue(make(1));
        queue.enqueue(make(2));
        queue.enqueue(make(3));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain_all(), 3);
        assert_eq!(*log.lock(), vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_thunk_enqueued_during_drain_runs_last() {
        let queue = DispatchQueue::new();
        let (log, make) = recorder();

        let reentrant = queue.clone();
        let t4 = make(4);
        let log_t1 = log.clone();
        queue.enqueue(move || {
            log_t1.lock().push(1);
            reentrant.enqueue(t4);
        });
        queue.enqueue(make(2));
        queue.enqueue(make(3));

        assert_eq!(queue.drain_all(), 4);
        assert_eq!(*log.lock(), vec![1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_empty_is_noop() {
        let queue = DispatchQueue::new();
        assert_eq!(queue.drain_all(), 0);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_clones_share_storage() {
        let queue = DispatchQueue::new();
        let other = queue.clone();
        let (log, make) = recorder();

        other.enqueue(make(9));
        assert_eq!(queue.len(), 1);
        queue.drain_all();
        assert_eq!(*log.lock(), vec![9]);
    }
}
