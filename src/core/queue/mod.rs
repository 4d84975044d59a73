//! Work queue with an outstanding-task counter decoupled from queue length.
//!
//! `len()` answers "how many items are waiting right now"; `outstanding()`
//! answers "how much work, including work not yet enqueued, remains to be
//! done". A worker that pops an item and fans out child work elsewhere must
//! keep the item's slot outstanding until that child work finishes too —
//! see `core::intake`, where a directory re-enqueues its children into the
//! same queue before decrementing.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A task queue carrying items of type `T`.
///
/// Cloning shares the underlying channel and counter — clone it to hand a
/// queue handle to each worker thread.
pub struct TaskQueue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    outstanding: std::sync::Arc<AtomicUsize>,
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            outstanding: self.outstanding.clone(),
        }
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            outstanding: std::sync::Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Enqueue an item and count it as outstanding work.
    pub fn insert(&self, item: T) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.sender
            .send(item)
            .expect("task queue receiver dropped while sender still live");
    }

    /// Non-blocking pop. Does not touch the outstanding counter — the
    /// caller decides when the item's work (and any work it fans out) is
    /// actually done.
    pub fn poll(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Mark one unit of outstanding work as complete. Called once per
    /// item, after all work it represents (including child items it
    /// enqueued) has finished.
    pub fn decrement_outstanding(&self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }

    /// Instantaneous number of items waiting in the channel.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items inserted minus items fully processed. Zero means the queue
    /// is drained even if workers haven't polled the last empty result.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}
