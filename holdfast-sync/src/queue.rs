//! Staging queues feeding batched remote calls.

use std::sync::Mutex;

/// FIFO of entries waiting for the next flush.
///
/// A flush takes the whole queue at once; anything staged while the flush is
/// in flight lands in the next batch.
#[derive(Debug)]
pub struct StagingQueue<E> {
    entries: Mutex<Vec<E>>,
}

impl<E> StagingQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, entry: E) {
        self.entries.lock().unwrap().push(entry);
    }

    pub fn extend(&self, entries: impl IntoIterator<Item = E>) {
        self.entries.lock().unwrap().extend(entries);
    }

    /// Drops every staged entry matching `cancelled`, returning how many were
    /// dropped.
    pub fn cancel(&self, mut cancelled: impl FnMut(&E) -> bool) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|entry| !cancelled(entry));
        before - entries.len()
    }

    /// Takes every staged entry, leaving the queue empty.
    pub fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }

    /// Puts a failed batch back ahead of anything staged since it was taken.
    pub fn restore_front(&self, mut batch: Vec<E>) {
        let mut entries = self.entries.lock().unwrap();
        batch.append(&mut entries);
        *entries = batch;
    }

    /// Returns true if any staged entry matches `pred`.
    pub fn any(&self, pred: impl FnMut(&E) -> bool) -> bool {
        self.entries.lock().unwrap().iter().any(pred)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for StagingQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
