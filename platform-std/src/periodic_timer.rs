//! Periodic timer over a dedicated `std::thread` sleep loop.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use rtmech_oswrapper::error::Result;
use rtmech_oswrapper::periodic_timer::{PeriodicTimer, PeriodicTimerFactory};
use rtmech_oswrapper::runnable::Runnable;
use rtmech_oswrapper::thread::{ThreadExceptionHandler, default_exception_handler};

struct Core {
    name: &'static str,
    runnable: &'static dyn Runnable,
    period_millis: u32,
    running: AtomicBool,
    stop_requested: AtomicBool,
    handle: StdMutex<Option<std::thread::JoinHandle<()>>>,
    exception_handler: StdMutex<Option<&'static dyn ThreadExceptionHandler>>,
}

pub struct StdPeriodicTimerImpl(Arc<Core>);

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

impl StdPeriodicTimerImpl {
    fn new(runnable: &'static dyn Runnable, period_millis: u32, name: &'static str) -> Self {
        Self(Arc::new(Core {
            name,
            runnable,
            period_millis,
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            handle: StdMutex::new(None),
            exception_handler: StdMutex::new(None),
        }))
    }
}

impl PeriodicTimer for StdPeriodicTimerImpl {
    fn start(&self) -> Result<()> {
        if self.0.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Ok(());
        }
        self.0.stop_requested.store(false, Ordering::Release);
        let core = Arc::clone(&self.0);
        let join = std::thread::Builder::new()
            .name(core.name.to_string())
            .spawn(move || {
                while !core.stop_requested.load(Ordering::Acquire) {
                    std::thread::sleep(std::time::Duration::from_millis(core.period_millis as u64));
                    if core.stop_requested.load(Ordering::Acquire) {
                        break;
                    }
                    let result = catch_unwind(AssertUnwindSafe(|| core.runnable.run()));
                    if result.is_err() {
                        core.stop_requested.store(true, Ordering::Release);
                        core.running.store(false, Ordering::Release);
                        log::trace!("periodic timer '{}' dispatching exception handler", core.name);
                        let handler = core.exception_handler.lock().unwrap().unwrap_or_else(default_exception_handler);
                        let thread_ref = TimerAsThread(Arc::clone(&core));
                        handler.handle(&thread_ref);
                        break;
                    }
                }
                core.running.store(false, Ordering::Release);
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
        self.0.running.store(false, Ordering::Release);
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.0.running.load(Ordering::Acquire)
    }

    fn name(&self) -> &str {
        self.0.name
    }

    fn set_exception_handler(&self, handler: &'static dyn ThreadExceptionHandler) {
        *self.0.exception_handler.lock().unwrap() = Some(handler);
    }
}

pub struct StdPeriodicTimerFactory;

impl PeriodicTimerFactory for StdPeriodicTimerFactory {
    fn create(&self, runnable: &'static dyn Runnable, period_millis: u32, name: &'static str) -> Option<Box<dyn PeriodicTimer>> {
        Some(Box::new(StdPeriodicTimerImpl::new(runnable, period_millis, name)))
    }
}
