//! Recursive mutex over `std::sync::{Mutex, Condvar}`.
//!
//! Priority-ceiling attributes are recorded but not enforced here — there
//! is no portable way to boost a `std::thread` priority, so a backend that
//! actually needs the inversion-avoidance guarantee must bind to native OS
//! primitives instead of this reference implementation.

use std::sync::{Condvar, Mutex as StdMutex};

use rtmech_oswrapper::error::{Error, Result};
use rtmech_oswrapper::mutex::{Mutex, MutexAttribute, MutexFactory};
use rtmech_oswrapper::timeout::Timeout;

use crate::thread_id::calling_thread_id;

struct State {
    owner: Option<u64>,
    depth: u32,
}

pub struct StdMutexImpl {
    state: StdMutex<State>,
    cond: Condvar,
    #[allow(dead_code)]
    attribute: MutexAttribute,
}

impl StdMutexImpl {
    fn new(attribute: MutexAttribute) -> Self {
        Self {
            state: StdMutex::new(State { owner: None, depth: 0 }),
            cond: Condvar::new(),
            attribute,
        }
    }
}

impl Mutex for StdMutexImpl {
    fn timed_lock(&self, timeout: Timeout) -> Result<()> {
        let me = calling_thread_id();
        let mut guard = self.state.lock().unwrap();
        loop {
            match guard.owner {
                Some(owner) if owner == me => {
                    guard.depth += 1;
                    return Ok(());
                }
                None => {
                    guard.owner = Some(me);
                    guard.depth = 1;
                    return Ok(());
                }
                Some(_) => {
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
    }

    fn unlock(&self) -> Result<()> {
        let me = calling_thread_id();
        let mut guard = self.state.lock().unwrap();
        match guard.owner {
            Some(owner) if owner == me => {
                guard.depth -= 1;
                if guard.depth == 0 {
                    guard.owner = None;
                    drop(guard);
                    self.cond.notify_one();
                }
                Ok(())
            }
            _ => Err(Error::NotLocked),
        }
    }
}

pub struct StdMutexFactory;

impl MutexFactory for StdMutexFactory {
    fn create(&self, attribute: MutexAttribute) -> Option<Box<dyn Mutex>> {
        Some(Box::new(StdMutexImpl::new(attribute)))
    }
}
