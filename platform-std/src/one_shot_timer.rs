//! One-shot timer over a dedicated `std::thread` sleep.
//!
//! `start` while a fire is already pending is ignored, per the resolved
//! restart policy documented on [`OneShotTimer::start`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use rtmech_oswrapper::error::Result;
use rtmech_oswrapper::one_shot_timer::{OneShotTimer, OneShotTimerFactory};
use rtmech_oswrapper::runnable::Runnable;
use rtmech_oswrapper::thread::{ThreadExceptionHandler, default_exception_handler};

struct Core {
    name: &'static str,
    runnable: &'static dyn Runnable,
    pending: AtomicBool,
    stop_requested: AtomicBool,
    handle: StdMutex<Option<std::thread::JoinHandle<()>>>,
    exception_handler: StdMutex<Option<&'static dyn ThreadExceptionHandler>>,
}

pub struct StdOneShotTimerImpl(Arc<Core>);

struct TimerAsThread(Arc<Core>);

impl rtmech_oswrapper::thread::Thread for TimerAsThread {
    fn start(&self) -> Result<()> {
        Ok(())
    }
    fn timed_wait(&self, _timeout: rtmech_oswrapper::timeout::Timeout) -> Result<()> {
        Ok(())
    }
    fn name(&self) -> &str {
        self.0.name
    }
    fn priority(&self) -> i32 {
        0
    }
    fn set_exception_handler(&self, _handler: &'static dyn ThreadExceptionHandler) {}
}

impl StdOneShotTimerImpl {
    fn new(runnable: &'static dyn Runnable, name: &'static str) -> Self {
        Self(Arc::new(Core {
            name,
            runnable,
            pending: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            handle: StdMutex::new(None),
            exception_handler: StdMutex::new(None),
        }))
    }
}

impl OneShotTimer for StdOneShotTimerImpl {
    fn start(&self, delay_millis: u32) -> Result<()> {
        if self.0.pending.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            // Already pending: ignored per the resolved restart policy.
            return Ok(());
        }
        self.0.stop_requested.store(false, Ordering::Release);
        let core = Arc::clone(&self.0);
        let join = std::thread::Builder::new()
            .name(core.name.to_string())
            .spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(delay_millis as u64));
                if core.stop_requested.load(Ordering::Acquire) {
                    core.pending.store(false, Ordering::Release);
                    return;
                }
                let result = catch_unwind(AssertUnwindSafe(|| core.runnable.run()));
                core.pending.store(false, Ordering::Release);
                if result.is_err() {
                    log::trace!("one-shot timer '{}' dispatching exception handler", core.name);
                    let handler = core.exception_handler.lock().unwrap().unwrap_or_else(default_exception_handler);
                    let thread_ref = TimerAsThread(Arc::clone(&core));
                    handler.handle(&thread_ref);
                }
            })
            .expect("failed to spawn timer thread");
        *self.0.handle.lock().unwrap() = Some(join);
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        self.0.stop_requested.store(true, Ordering::Release);
        if let Some(handle) = self.0.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
        self.0.pending.store(false, Ordering::Release);
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.0.pending.load(Ordering::Acquire)
    }

    fn name(&self) -> &str {
        self.0.name
    }

    fn set_exception_handler(&self, handler: &'static dyn ThreadExceptionHandler) {
        *self.0.exception_handler.lock().unwrap() = Some(handler);
    }
}

pub struct StdOneShotTimerFactory;

impl OneShotTimerFactory for StdOneShotTimerFactory {
    fn create(&self, runnable: &'static dyn Runnable, name: &'static str) -> Option<Box<dyn OneShotTimer>> {
        Some(Box::new(StdOneShotTimerImpl::new(runnable, name)))
    }
}
