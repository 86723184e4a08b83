//! Timer that re-invokes its `Runnable` every `period_millis`.

extern crate alloc;
use alloc::boxed::Box;

use crate::error::Result;
use crate::once::FactorySlot;
use crate::runnable::Runnable;
use crate::thread::ThreadExceptionHandler;

pub trait PeriodicTimer: Send + Sync {
    fn start(&self) -> Result<()>;

    /// Cancels the timer. The exception handler (if the runnable just
    /// panicked) is invoked only after the timer is fully stopped.
    fn stop(&self) -> Result<()>;

    fn is_started(&self) -> bool;
    fn name(&self) -> &str;
    fn set_exception_handler(&self, handler: &'static dyn ThreadExceptionHandler);
}

pub trait PeriodicTimerFactory: Sync {
    /// Returns `None` if `period_millis == 0` — a zero-period periodic
    /// timer is rejected at creation.
    fn create(
        &self,
        runnable: &'static dyn Runnable,
        period_millis: u32,
        name: &'static str,
    ) -> Option<Box<dyn PeriodicTimer>>;
}

static PERIODIC_TIMER_FACTORY: FactorySlot<&'static dyn PeriodicTimerFactory> = FactorySlot::new();

pub fn register_periodic_timer_factory(factory: &'static dyn PeriodicTimerFactory) {
    log::debug!("periodic timer factory registered");
    PERIODIC_TIMER_FACTORY.register(factory);
}

pub fn create_periodic_timer(
    runnable: &'static dyn Runnable,
    period_millis: u32,
    name: &'static str,
) -> Option<Box<dyn PeriodicTimer>> {
    if period_millis == 0 {
        return None;
    }
    PERIODIC_TIMER_FACTORY.require().create(runnable, period_millis, name)
}

#[cfg(test)]
pub(crate) fn reset_periodic_timer_factory_for_test() {
    PERIODIC_TIMER_FACTORY.reset_for_test();
}
