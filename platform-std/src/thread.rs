//! Threads over `std::thread`, with panic-to-exception-handler routing.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex as StdMutex};

use rtmech_oswrapper::error::{Error, Result};
use rtmech_oswrapper::runnable::Runnable;
use rtmech_oswrapper::thread::{Thread, ThreadExceptionHandler, ThreadFactory, default_exception_handler};
use rtmech_oswrapper::timeout::Timeout;

static NEXT_MANAGED_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static MANAGED_THREAD_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

struct ThreadCore {
    name: &'static str,
    priority: i32,
    runnable: &'static dyn Runnable,
    assigned_id: u64,
    running: AtomicBool,
    handle: StdMutex<Option<std::thread::JoinHandle<()>>>,
    finished: StdMutex<bool>,
    finished_cond: Condvar,
    exception_handler: StdMutex<Option<&'static dyn ThreadExceptionHandler>>,
}

#[derive(Clone)]
pub struct StdThreadImpl(Arc<ThreadCore>);

impl StdThreadImpl {
    fn new(runnable: &'static dyn Runnable, priority: i32, name: &'static str) -> Self {
        Self(Arc::new(ThreadCore {
            name,
            priority,
            runnable,
            assigned_id: NEXT_MANAGED_ID.fetch_add(1, Ordering::Relaxed),
            running: AtomicBool::new(false),
            handle: StdMutex::new(None),
            finished: StdMutex::new(true),
            finished_cond: Condvar::new(),
            exception_handler: StdMutex::new(None),
        }))
    }
}

impl Thread for StdThreadImpl {
    fn start(&self) -> Result<()> {
        if self.0.running.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return Ok(());
        }
        *self.0.finished.lock().unwrap() = false;
        let core = Arc::clone(&self.0);
        let builder = std::thread::Builder::new().name(core.name.to_string());
        let join = builder
            .spawn(move || {
                MANAGED_THREAD_ID.with(|cell| cell.set(Some(core.assigned_id)));
                let result = catch_unwind(AssertUnwindSafe(|| core.runnable.run()));
                if result.is_err() {
                    let handler = core.exception_handler.lock().unwrap().unwrap_or_else(default_exception_handler);
                    let thread_ref = StdThreadImpl(Arc::clone(&core));
                    handler.handle(&thread_ref);
                }
                core.running.store(false, Ordering::Release);
                *core.finished.lock().unwrap() = true;
                core.finished_cond.notify_all();
            })
            .expect("failed to spawn OS thread");
        *self.0.handle.lock().unwrap() = Some(join);
        Ok(())
    }

    fn timed_wait(&self, timeout: Timeout) -> Result<()> {
        let guard = self.0.finished.lock().unwrap();
        let guard = if *guard {
            guard
        } else if timeout.is_polling() {
            return Err(Error::TimedOut);
        } else {
            match timeout.as_millis() {
                None => self.0.finished_cond.wait_while(guard, |f| !*f).unwrap(),
                Some(ms) => {
                    let (g, timed_out) = self
                        .0
                        .finished_cond
                        .wait_timeout_while(guard, std::time::Duration::from_millis(ms as u64), |f| !*f)
                        .unwrap();
                    if timed_out.timed_out() {
                        return Err(Error::TimedOut);
                    }
                    g
                }
            }
        };
        drop(guard);
        if let Some(handle) = self.0.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        self.0.name
    }

    fn priority(&self) -> i32 {
        self.0.priority
    }

    fn set_exception_handler(&self, handler: &'static dyn ThreadExceptionHandler) {
        *self.0.exception_handler.lock().unwrap() = Some(handler);
    }
}

pub struct StdThreadFactory;

impl ThreadFactory for StdThreadFactory {
    fn create(
        &self,
        runnable: &'static dyn Runnable,
        priority: i32,
        _stack_size: usize,
        name: &'static str,
    ) -> Option<Box<dyn Thread>> {
        let priority = if priority == rtmech_oswrapper::thread::INHERIT_PRIORITY {
            self.normal_priority()
        } else {
            priority
        };
        Some(Box::new(StdThreadImpl::new(runnable, priority, name)))
    }

    fn sleep(&self, millis: u32) {
        std::thread::sleep(std::time::Duration::from_millis(millis as u64));
    }

    fn yield_now(&self) {
        std::thread::yield_now();
    }

    fn normal_priority(&self) -> i32 {
        0
    }

    fn current_thread_id(&self) -> Option<u64> {
        MANAGED_THREAD_ID.with(|cell| cell.get())
    }
}
