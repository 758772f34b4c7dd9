//! Reusable scratch values for remote requests.
//!
//! Descriptor batches are checked out for the duration of one remote call and
//! handed back when the [`Pooled`] guard drops, on success and error paths
//! alike.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A value that can be reset to a reusable blank state.
pub trait Recycle: Default {
    fn recycle(&mut self);
}

impl<T> Recycle for Vec<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}

/// Bounded free list of reusable values.
#[derive(Debug)]
pub struct ObjectPool<T: Recycle> {
    free: Mutex<Vec<T>>,
    capacity: usize,
    outstanding: AtomicUsize,
}

impl<T: Recycle> ObjectPool<T> {
    /// Creates an empty pool that retains at most `capacity` idle values.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Takes a blank value, allocating one if the pool is empty.
    pub fn checkout(&self) -> Pooled<'_, T> {
        let value = self.free.lock().unwrap().pop().unwrap_or_default();
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        Pooled { pool: self, value }
    }

    /// Number of idle values ready for checkout.
    pub fn available(&self) -> usize {
        self.free.lock().unwrap().len()
    }

    /// Number of values currently checked out.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    fn give_back(&self, mut value: T) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        value.recycle();
        let mut free = self.free.lock().unwrap();
        if free.len() < self.capacity {
            free.push(value);
        }
    }
}

impl<T: Recycle> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new(8)
    }
}

/// A checked-out value. Returns itself to the pool on drop.
pub struct Pooled<'a, T: Recycle> {
    pool: &'a ObjectPool<T>,
    value: T,
}

impl<T: Recycle> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Recycle> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Recycle> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.value));
    }
}
