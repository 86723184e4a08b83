//! Recursive mutex with optional priority-ceiling attribute.

extern crate alloc;
use alloc::boxed::Box;

use crate::error::Result;
use crate::once::FactorySlot;
use crate::timeout::Timeout;

/// Locking discipline requested at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexAttribute {
    /// Default: the holder's priority is unaffected by contention.
    PriorityInherit,
    /// The holder is boosted to `ceiling` for the lock's duration.
    PriorityCeiling(u8),
}

impl Default for MutexAttribute {
    fn default() -> Self {
        MutexAttribute::PriorityInherit
    }
}

/// A recursive mutex: the owning thread may lock it more than once and
/// must unlock it an equal number of times.
pub trait Mutex: Send + Sync {
    /// Blocks until acquired. Returns [`Error::CalledByNonThread`] if
    /// called outside a managed thread.
    fn lock(&self) -> Result<()> {
        self.timed_lock(Timeout::Forever)
    }

    /// Non-blocking; returns [`Error::TimedOut`] if already held by another owner.
    fn try_lock(&self) -> Result<()> {
        self.timed_lock(Timeout::Polling)
    }

    fn timed_lock(&self, timeout: Timeout) -> Result<()>;

    /// Releases one level of recursion. Returns [`Error::NotLocked`] if the
    /// calling thread does not currently hold the mutex.
    fn unlock(&self) -> Result<()>;
}

pub trait MutexFactory: Sync {
    fn create(&self, attribute: MutexAttribute) -> Option<Box<dyn Mutex>>;
}

static MUTEX_FACTORY: FactorySlot<&'static dyn MutexFactory> = FactorySlot::new();

pub fn register_mutex_factory(factory: &'static dyn MutexFactory) {
    log::debug!("mutex factory registered");
    MUTEX_FACTORY.register(factory);
}

pub fn create_mutex(attribute: MutexAttribute) -> Option<Box<dyn Mutex>> {
    MUTEX_FACTORY.require().create(attribute)
}

#[cfg(test)]
pub(crate) fn reset_mutex_factory_for_test() {
    MUTEX_FACTORY.reset_for_test();
}

/// RAII scoped lock. Acquires on construction, releases on every exit path
/// including unwinding.
pub struct LockGuard<'a> {
    mutex: &'a dyn Mutex,
    adopted: bool,
}

impl<'a> LockGuard<'a> {
    pub fn new(mutex: &'a dyn Mutex, timeout: Timeout) -> Result<Self> {
        mutex.timed_lock(timeout)?;
        Ok(Self { mutex, adopted: false })
    }

    /// Wraps an already-held lock without re-acquiring it; `unlock` still
    /// runs once on drop.
    pub fn adopt(mutex: &'a dyn Mutex) -> Self {
        Self { mutex, adopted: true }
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        let _ = self.mutex.unlock();
        let _ = self.adopted;
    }
}

impl core::fmt::Debug for LockGuard<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LockGuard").field("adopted", &self.adopted).finish()
    }
}
