//! Event flag over `std::sync::{Mutex, Condvar}`.

use std::sync::{Condvar, Mutex as StdMutex};

use rtmech_oswrapper::error::{Error, Result};
use rtmech_oswrapper::event_flag::{BitPattern, EventFlag, EventFlagFactory, ResetMode, WaitMode};
use rtmech_oswrapper::timeout::Timeout;

pub struct StdEventFlagImpl {
    pattern: StdMutex<BitPattern>,
    cond: Condvar,
    reset_mode: ResetMode,
}

impl StdEventFlagImpl {
    fn new(initial_pattern: BitPattern, reset_mode: ResetMode) -> Self {
        Self {
            pattern: StdMutex::new(initial_pattern),
            cond: Condvar::new(),
            reset_mode,
        }
    }

    fn satisfied(&self, current: BitPattern, requested: BitPattern, mode: WaitMode) -> bool {
        match mode {
            WaitMode::Or => current & requested != 0,
            WaitMode::And => current & requested == requested,
        }
    }
}

impl EventFlag for StdEventFlagImpl {
    fn set(&self, pattern: BitPattern) -> Result<()> {
        let mut guard = self.pattern.lock().unwrap();
        *guard |= pattern;
        drop(guard);
        self.cond.notify_all();
        Ok(())
    }

    fn reset(&self, pattern: BitPattern) -> Result<()> {
        let mut guard = self.pattern.lock().unwrap();
        *guard &= !pattern;
        Ok(())
    }

    fn current_pattern(&self) -> BitPattern {
        *self.pattern.lock().unwrap()
    }

    fn wait(&self, pattern: BitPattern, mode: WaitMode, timeout: Timeout) -> Result<BitPattern> {
        if pattern == 0 {
            return Err(Error::InvalidParameter);
        }
        let mut guard = self.pattern.lock().unwrap();
        loop {
            if self.satisfied(*guard, pattern, mode) {
                let released = *guard & pattern;
                if self.reset_mode == ResetMode::Auto {
                    *guard &= !released;
                }
                return Ok(released);
            }
            if timeout.is_polling() {
                return Err(Error::TimedOut);
            }
            guard = match timeout.as_millis() {
                None => self.cond.wait(guard).unwrap(),
                Some(ms) => {
                    let (g, timed_out) = self
                        .cond
                        .wait_timeout(guard, std::time::Duration::from_millis(ms as u64))
                        .unwrap();
                    if timed_out.timed_out() {
                        return Err(Error::TimedOut);
                    }
                    g
                }
            };
        }
    }
}

pub struct StdEventFlagFactory;

impl EventFlagFactory for StdEventFlagFactory {
    fn create(&self, initial_pattern: BitPattern, reset_mode: ResetMode) -> Option<Box<dyn EventFlag>> {
        Some(Box::new(StdEventFlagImpl::new(initial_pattern, reset_mode)))
    }
}
