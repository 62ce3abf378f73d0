// Snapshot request flag
//
// Set from any thread (hotkey handler, timer), consumed by the render loop.
// Only the intent crosses threads; pixel data never does.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "take a snapshot" signal
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRequest {
    pending: Arc<AtomicBool>,
}

impl SnapshotRequest {
    /// Create a flag with no request pending
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a snapshot of the next rendered frame
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Whether a request is waiting
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Consume a pending request; returns whether there was one
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Drop any pending request
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_take_consumes_request() {
        let request = SnapshotRequest::new();
        assert!(!request.take());

        request.request();
        assert!(request.is_pending());
        assert!(request.take());
        assert!(!request.is_pending());
        assert!(!request.take());
    }

    #[test]
    fn test_clones_share_flag() {
        let request = SnapshotRequest::new();
        let requester = request.clone();
        requester.request();
        assert!(request.is_pending());

        request.clear();
        assert!(!requester.is_pending());
    }

    #[test]
    fn test_request_from_other_thread() {
        let request = SnapshotRequest::new();
        let requester = request.clone();

        thread::spawn(move || requester.request())
            .join()
            .expect("requester thread panicked");

        assert!(request.take());
    }
}
