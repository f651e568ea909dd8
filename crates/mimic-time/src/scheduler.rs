//! Frame scheduling - the "schedule next tick" capability
//!
//! A display host fires one callback per refresh, with no guaranteed
//! interval. Consumers request the next frame explicitly and may cancel
//! a request before it fires.

use std::sync::Arc;

use parking_lot::Mutex;

/// Handle for one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// Capability to schedule the next frame callback
pub trait FrameScheduler {
    /// Request one callback on the next display refresh
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancel a request that has not fired yet. Cancelling a request
    /// that already fired (or never existed) does nothing.
    fn cancel_frame(&mut self, request: FrameRequest);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Box<S> {
    fn request_frame(&mut self) -> FrameRequest {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        (**self).cancel_frame(request)
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    pending: Vec<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

/// Frame scheduler driven by a host loop
///
/// Clones share the same queue. The host calls [`FrameQueue::take_due`]
/// once per refresh and dispatches every returned request.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the requests due on this refresh, oldest first
    pub fn take_due(&self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.inner.lock().pending)
    }

    /// Number of requests waiting for the next refresh
    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }

    /// Total requests ever made
    pub fn requested(&self) -> u64 {
        self.inner.lock().requested
    }

    /// Total requests cancelled before firing
    pub fn cancelled(&self) -> u64 {
        self.inner.lock().cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameRequest {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let request = FrameRequest(inner.next_id);
        inner.pending.push(request);
        inner.requested += 1;
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let mut inner = self.inner.lock();
        let before = inner.pending.len();
        inner.pending.retain(|r| *r != request);
        if inner.pending.len() < before {
            inner.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_take() {
        let mut queue = FrameQueue::new();
        let host = queue.clone();

        let a = queue.request_frame();
        let b = queue.request_frame();
        assert_ne!(a, b);
        assert_eq!(host.pending_count(), 2);

        assert_eq!(host.take_due(), vec![a, b]);
        assert!(host.is_idle());
    }

    #[test]
    fn test_cancel_before_fire() {
        let mut queue = FrameQueue::new();

        let request = queue.request_frame();
        queue.cancel_frame(request);

        assert!(queue.take_due().is_empty());
        assert_eq!(queue.cancelled(), 1);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut queue = FrameQueue::new();

        let request = queue.request_frame();
        let fired = queue.take_due();
        queue.cancel_frame(request);

        assert_eq!(fired, vec![request]);
        assert_eq!(queue.cancelled(), 0);
        assert_eq!(queue.requested(), 1);
    }
}
