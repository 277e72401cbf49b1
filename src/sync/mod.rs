use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};

/// Shared, mutex-protected data. Cloning hands out another reference to the same latch.
pub struct Synchronized<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Synchronized<T> {
    pub fn init(data: T) -> Self {
        Synchronized {
            inner: Arc::new(Mutex::new(data)),
        }
    }

    /// Consumes the last reference and returns the protected value, or gives the latch back if
    /// other references are still alive
    pub fn into_inner(self) -> std::result::Result<T, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner()),
            Err(inner) => Err(Synchronized { inner }),
        }
    }
}

impl<T> Clone for Synchronized<T> {
    fn clone(&self) -> Self {
        Synchronized {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Exclusive latching. The latch is released when the returned guard is dropped
pub trait Latch {
    type Target;
    fn latch(&self) -> MutexGuard<'_, Self::Target>;
    fn try_latch(&self) -> Option<MutexGuard<'_, Self::Target>>;
}

impl<T> Latch for Synchronized<T> {
    type Target = T;

    #[inline]
    fn latch(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    #[inline]
    fn try_latch(&self) -> Option<MutexGuard<'_, T>> {
        self.inner.try_lock()
    }
}

struct SemaphoreState {
    posted: Mutex<bool>,
    cond: Condvar,
}

/// One-shot signal shared between threads. Once posted it stays posted
#[derive(Clone)]
pub struct BinarySemaphore {
    state: Arc<SemaphoreState>,
}

pub trait BinarySemaphoreMethods {
    fn post(&self);
    fn wait(&self) -> bool;
    fn wait_for(&self, timeout: Duration) -> bool;
    fn is_posted(&self) -> bool;
}

impl BinarySemaphore {
    pub fn init(posted: bool) -> Self {
        BinarySemaphore {
            state: Arc::new(SemaphoreState {
                posted: Mutex::new(posted),
                cond: Condvar::new(),
            }),
        }
    }
}

impl BinarySemaphoreMethods for BinarySemaphore {
    fn post(&self) {
        let mut posted = self.state.posted.lock();
        *posted = true;
        self.state.cond.notify_all();
    }

    /// Blocks until the semaphore is posted
    fn wait(&self) -> bool {
        let mut posted = self.state.posted.lock();
        while !*posted {
            self.state.cond.wait(&mut posted);
        }
        *posted
    }

    /// Blocks until the semaphore is posted or `timeout` elapses. Returns whether it was posted
    fn wait_for(&self, timeout: Duration) -> bool {
        let mut posted = self.state.posted.lock();
        if !*posted {
            // spurious wakeups only shorten the wait; callers re-check on every wake
            self.state.cond.wait_for(&mut posted, timeout);
        }
        *posted
    }

    fn is_posted(&self) -> bool {
        *self.state.posted.lock()
    }
}
