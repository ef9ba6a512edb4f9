//! Concurrency slots bounding in-flight copies.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Counting semaphore over the configured parallelism.
#[derive(Debug)]
pub struct ConcurrencySlots {
    capacity: usize,
    in_use: Mutex<usize>,
    released: Condvar,
    peak: AtomicUsize,
}

impl ConcurrencySlots {
    /// Create slots for `capacity` concurrent holders (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            in_use: Mutex::new(0),
            released: Condvar::new(),
            peak: AtomicUsize::new(0),
        }
    }

    /// Take a slot, blocking while all slots are held.
    ///
    /// The slot is returned when the guard is dropped.
    pub fn acquire(&self) -> SlotGuard<'_> {
        let guard = self.lock();
        let mut in_use = self
            .released
            .wait_while(guard, |in_use| *in_use >= self.capacity)
            .unwrap_or_else(PoisonError::into_inner);
        *in_use += 1;
        self.peak.fetch_max(*in_use, Ordering::SeqCst);
        SlotGuard { slots: self }
    }

    /// Maximum number of concurrent holders.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently held.
    #[must_use]
    pub fn in_use(&self) -> usize {
        *self.lock()
    }

    /// Highest number of slots held at once.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn release(&self) {
        {
            let mut in_use = self.lock();
            *in_use -= 1;
        }
        self.released.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held concurrency slot.
#[derive(Debug)]
pub struct SlotGuard<'a> {
    slots: &'a ConcurrencySlots,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slots.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_guard_releases_on_drop() {
        let slots = ConcurrencySlots::new(2);
        let first = slots.acquire();
        let second = slots.acquire();
        assert_eq!(slots.in_use(), 2);

        drop(first);
        assert_eq!(slots.in_use(), 1);
        drop(second);
        assert_eq!(slots.in_use(), 0);
        assert_eq!(slots.peak(), 2);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let slots = ConcurrencySlots::new(0);
        assert_eq!(slots.capacity(), 1);
        let _guard = slots.acquire();
        assert_eq!(slots.in_use(), 1);
    }

    #[test]
    fn test_acquire_blocks_at_capacity() {
        let slots = Arc::new(ConcurrencySlots::new(3));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let slots = Arc::clone(&slots);
                thread::spawn(move || {
                    let _guard = slots.acquire();
                    thread::sleep(Duration::from_millis(5));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(slots.peak() <= 3);
        assert_eq!(slots.in_use(), 0);
    }
}
