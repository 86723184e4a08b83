//! Timer that fires its `Runnable` once, after a delay.

extern crate alloc;
use alloc::boxed::Box;

use crate::error::Result;
use crate::once::FactorySlot;
use crate::runnable::Runnable;
use crate::thread::ThreadExceptionHandler;

pub trait OneShotTimer: Send + Sync {
    /// Arms the timer to fire `delay_millis` from now.
    ///
    /// Calling `start` again while a fire is already pending is ignored —
    /// the pending fire runs to completion (or until `stop`) unaffected.
    /// This is the resolved policy for the "restart while pending" case.
    fn start(&self, delay_millis: u32) -> Result<()>;

    fn stop(&self) -> Result<()>;
    fn is_started(&self) -> bool;
    fn name(&self) -> &str;
    fn set_exception_handler(&self, handler: &'static dyn ThreadExceptionHandler);
}

pub trait OneShotTimerFactory: Sync {
    fn create(&self, runnable: &'static dyn Runnable, name: &'static str) -> Option<Box<dyn OneShotTimer>>;
}

static ONE_SHOT_TIMER_FACTORY: FactorySlot<&'static dyn OneShotTimerFactory> = FactorySlot::new();

pub fn register_one_shot_timer_factory(factory: &'static dyn OneShotTimerFactory) {
    log::debug!("one-shot timer factory registered");
    ONE_SHOT_TIMER_FACTORY.register(factory);
}

pub fn create_one_shot_timer(
    runnable: &'static dyn Runnable,
    name: &'static str,
) -> Option<Box<dyn OneShotTimer>> {
    ONE_SHOT_TIMER_FACTORY.require().create(runnable, name)
}

#[cfg(test)]
pub(crate) fn reset_one_shot_timer_factory_for_test() {
    ONE_SHOT_TIMER_FACTORY.reset_for_test();
}
