//! Exclusive-access token guarding one shared buffer or coding pair.
//!
//! A plain atomic-flag spinlock with an RAII guard. Byte-moving contexts use
//! [`TryLock::try_lock`] and treat contention as "skip this pass"; only the
//! line-coding pair is ever acquired with the spinning [`TryLock::lock`],
//! whose holders are O(1) critical sections.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

pub struct TryLock<T> {
    locked: AtomicBool,
    value: UnsafeCell<T>,
}

// SAFETY: access to the inner value is serialized by the `locked` flag; a
// guard exists only while the flag is held.
unsafe impl<T: Send> Sync for TryLock<T> {}

impl<T> TryLock<T> {
    pub const fn new(value: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    /// Non-blocking acquisition. Returns `None` if another context holds the
    /// token; safe to call from interrupt context.
    pub fn try_lock(&self) -> Option<TryLockGuard<'_, T>> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(TryLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Spin until the token is free. Must not be called from interrupt
    /// context, and never while already holding another token.
    pub fn lock(&self) -> TryLockGuard<'_, T> {
        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            core::hint::spin_loop();
        }
    }
}

pub struct TryLockGuard<'a, T> {
    lock: &'a TryLock<T>,
}

impl<T> Deref for TryLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock flag
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for TryLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock flag exclusively
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for TryLockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_lock_excludes_second_holder() {
        let lock = TryLock::new(0u32);

        let guard = lock.try_lock().expect("uncontended lock");
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn test_guard_mutates_value() {
        let lock = TryLock::new(1u32);

        {
            let mut guard = lock.lock();
            *guard += 41;
        }

        assert_eq!(*lock.lock(), 42);
    }

    #[test]
    fn test_threaded_increments_are_not_lost() {
        use std::sync::Arc;

        let lock = Arc::new(TryLock::new(0u64));
        let mut handles = Vec::new();

        for _ in 0..4 {
            let lock = Arc::clone(&lock);
            handles.push(std::thread::spawn(move || {
                for _ in 0..10_000 {
                    *lock.lock() += 1;
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*lock.lock(), 40_000);
    }
}
