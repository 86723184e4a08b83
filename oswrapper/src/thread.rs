//! Preemptive, parallel thread abstraction.

extern crate alloc;
use alloc::boxed::Box;

use crate::error::Result;
use crate::once::FactorySlot;
use crate::runnable::Runnable;
use crate::timeout::Timeout;

/// Passed as a thread's requested priority to inherit the creating
/// thread's priority instead of specifying one explicitly.
pub const INHERIT_PRIORITY: i32 = i32::MIN;

pub trait Thread: Send + Sync {
    /// Re-runs the `Runnable` if the thread is not currently running; a
    /// no-op while already running.
    fn start(&self) -> Result<()>;

    fn wait(&self) -> Result<()> {
        self.timed_wait(Timeout::Forever)
    }

    fn try_wait(&self) -> Result<()> {
        self.timed_wait(Timeout::Polling)
    }

    fn timed_wait(&self, timeout: Timeout) -> Result<()>;

    fn name(&self) -> &str;
    fn priority(&self) -> i32;

    /// Per-thread override of the process-wide default handler.
    fn set_exception_handler(&self, handler: &'static dyn ThreadExceptionHandler);
}

/// Invoked when a thread's `Runnable` panics, in preference order:
/// the thread's own handler, then [`default_exception_handler`].
pub trait ThreadExceptionHandler: Sync {
    fn handle(&self, thread: &dyn Thread);
}

struct LoggingExceptionHandler;

impl ThreadExceptionHandler for LoggingExceptionHandler {
    fn handle(&self, thread: &dyn Thread) {
        log::error!("thread '{}' panicked without a registered handler", thread.name());
    }
}

static DEFAULT_EXCEPTION_HANDLER: LoggingExceptionHandler = LoggingExceptionHandler;
static EXCEPTION_HANDLER_SLOT: FactorySlot<&'static dyn ThreadExceptionHandler> = FactorySlot::new();

pub fn register_default_exception_handler(handler: &'static dyn ThreadExceptionHandler) {
    log::debug!("default exception handler registered");
    EXCEPTION_HANDLER_SLOT.register(handler);
}

pub fn default_exception_handler() -> &'static dyn ThreadExceptionHandler {
    EXCEPTION_HANDLER_SLOT.get().unwrap_or(&DEFAULT_EXCEPTION_HANDLER)
}

pub trait ThreadFactory: Sync {
    fn create(
        &self,
        runnable: &'static dyn Runnable,
        priority: i32,
        stack_size: usize,
        name: &'static str,
    ) -> Option<Box<dyn Thread>>;

    fn sleep(&self, millis: u32);
    fn yield_now(&self);

    /// A priority value guaranteed valid for this backend.
    fn normal_priority(&self) -> i32;

    /// Identity of the calling thread if it is managed by this backend, to
    /// support `current_thread()`-style lookups without exposing a borrow.
    fn current_thread_id(&self) -> Option<u64>;
}

static THREAD_FACTORY: FactorySlot<&'static dyn ThreadFactory> = FactorySlot::new();

pub fn register_thread_factory(factory: &'static dyn ThreadFactory) {
    log::debug!("thread factory registered");
    THREAD_FACTORY.register(factory);
}

pub fn create_thread(
    runnable: &'static dyn Runnable,
    priority: i32,
    stack_size: usize,
    name: &'static str,
) -> Option<Box<dyn Thread>> {
    THREAD_FACTORY.require().create(runnable, priority, stack_size, name)
}

pub fn sleep(millis: u32) {
    THREAD_FACTORY.require().sleep(millis);
}

pub fn yield_now() {
    THREAD_FACTORY.require().yield_now();
}

pub fn normal_priority() -> i32 {
    THREAD_FACTORY.require().normal_priority()
}

pub fn current_thread_id() -> Option<u64> {
    THREAD_FACTORY.require().current_thread_id()
}

#[cfg(test)]
pub(crate) fn reset_thread_factory_for_test() {
    THREAD_FACTORY.reset_for_test();
}
