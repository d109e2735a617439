//! Frame scheduling
//!
//! A [`FrameScheduler`] runs a one-shot callback at the next display
//! refresh and hands back a handle that can cancel it. [`FrameQueue`] is a
//! manual implementation: the host calls [`FrameQueue::run_frame`] once per
//! refresh.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a pending frame callback
    pub struct FrameHandle;
}

/// One-shot callback run on the next frame
pub type FrameCallback = Box<dyn FnOnce()>;

/// Per-frame callback scheduler
pub trait FrameScheduler {
    /// Run `callback` at the next frame
    fn request_frame(&mut self, callback: FrameCallback) -> FrameHandle;

    /// Cancel a pending callback. Returns `false` if it already ran or was
    /// cancelled.
    fn cancel_frame(&mut self, handle: FrameHandle) -> bool;
}

/// Manually pumped frame scheduler
///
/// Callbacks requested while a frame runs are deferred to the following
/// frame, so a self-rescheduling loop advances once per frame.
pub struct FrameQueue {
    pending: SlotMap<FrameHandle, FrameCallback>,
    frame_count: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self {
            pending: SlotMap::with_key(),
            frame_count: 0,
        }
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Take the callbacks due this frame.
    ///
    /// Callers must release any borrow of the queue before invoking them,
    /// since callbacks usually request the next frame.
    pub fn take_due(&mut self) -> Vec<FrameCallback> {
        self.frame_count += 1;
        self.pending.drain().map(|(_, callback)| callback).collect()
    }

    /// Run one frame. Returns the number of callbacks invoked.
    ///
    /// The callbacks must not reach back into this queue; a queue shared
    /// through `RefCell` is pumped with [`run_until_idle`] instead.
    pub fn run_frame(&mut self) -> usize {
        let due = self.take_due();
        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, callback: FrameCallback) -> FrameHandle {
        let handle = self.pending.insert(callback);
        tracing::trace!(?handle, "frame requested");
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        let cancelled = self.pending.remove(handle).is_some();
        tracing::trace!(?handle, cancelled, "frame cancel");
        cancelled
    }
}

/// Pump a shared queue until it has nothing pending or `max_frames` have
/// run. Returns the number of frames run.
///
/// The queue borrow is released while callbacks execute so they can
/// request further frames.
pub fn run_until_idle(queue: &std::cell::RefCell<FrameQueue>, max_frames: usize) -> usize {
    let mut frames = 0;
    while frames < max_frames {
        let due = {
            let mut queue = queue.borrow_mut();
            if queue.is_idle() {
                break;
            }
            queue.take_due()
        };
        for callback in due {
            callback();
        }
        frames += 1;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_run_frame_invokes_pending() {
        let hits = Rc::new(Cell::new(0));
        let mut queue = FrameQueue::new();

        for _ in 0..3 {
            let hits = hits.clone();
            queue.request_frame(Box::new(move || hits.set(hits.get() + 1)));
        }

        assert_eq!(queue.pending(), 3);
        assert_eq!(queue.run_frame(), 3);
        assert_eq!(hits.get(), 3);
        assert!(queue.is_idle());
        assert_eq!(queue.frame_count(), 1);
    }

    #[test]
    fn test_cancel_frame() {
        let hits = Rc::new(Cell::new(0));
        let mut queue = FrameQueue::new();

        let handle = {
            let hits = hits.clone();
            queue.request_frame(Box::new(move || hits.set(hits.get() + 1)))
        };

        assert!(queue.cancel_frame(handle));
        assert!(!queue.cancel_frame(handle));
        assert_eq!(queue.run_frame(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_cancel_after_run_is_noop() {
        let mut queue = FrameQueue::new();
        let handle = queue.request_frame(Box::new(|| {}));
        queue.run_frame();
        assert!(!queue.cancel_frame(handle));
    }

    #[test]
    fn test_reschedule_defers_to_next_frame() {
        fn countdown(queue: Rc<RefCell<FrameQueue>>, left: Rc<Cell<u32>>) {
            let next = queue.clone();
            queue.borrow_mut().request_frame(Box::new(move || {
                left.set(left.get() - 1);
                if left.get() > 0 {
                    countdown(next, left);
                }
            }));
        }

        let queue = Rc::new(RefCell::new(FrameQueue::new()));
        let left = Rc::new(Cell::new(5));
        countdown(queue.clone(), left.clone());

        assert_eq!(run_until_idle(&queue, 100), 5);
        assert_eq!(left.get(), 0);
    }

    #[test]
    fn test_run_until_idle_respects_limit() {
        fn forever(queue: Rc<RefCell<FrameQueue>>) {
            let next = queue.clone();
            queue
                .borrow_mut()
                .request_frame(Box::new(move || forever(next)));
        }

        let queue = Rc::new(RefCell::new(FrameQueue::new()));
        forever(queue.clone());
        assert_eq!(run_until_idle(&queue, 10), 10);
        assert_eq!(queue.borrow().pending(), 1);
    }
}
