//! Process-wide, write-once factory registration slot.
//!
//! Each primitive kind (`Mutex`, `EventFlag`, ...) owns exactly one
//! [`FactorySlot`] as a `static`. The first `register()` call wins; later
//! callers are rejected in debug builds and silently ignored in release,
//! mirroring a "first writer wins" `OnceLock`.

use core::sync::atomic::{AtomicU8, Ordering};

const STATE_UNINIT: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_COMPLETE: u8 = 2;

/// A write-once slot holding a `&'static` reference to a factory
/// implementation, modeled on an `OnceLock<&'static dyn Trait>`.
pub struct FactorySlot<T: Copy + 'static> {
    state: AtomicU8,
    value: core::cell::UnsafeCell<Option<T>>,
}

// SAFETY: writes only happen once, gated by the STATE_UNINIT -> STATE_RUNNING
// CAS, and are published with Release/Acquire ordering before any reader can
// observe STATE_COMPLETE — the same discipline as the container `OnceLock`
// this is modeled on.
unsafe impl<T: Copy + Send + Sync> Sync for FactorySlot<T> {}

impl<T: Copy + 'static> FactorySlot<T> {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_UNINIT),
            value: core::cell::UnsafeCell::new(None),
        }
    }

    /// Registers `factory` if no factory has been registered yet.
    ///
    /// In debug builds, registering twice is a precondition violation
    /// (`debug_assert!`); release builds silently keep the first writer.
    pub fn register(&self, factory: T) {
        if self
            .state
            .compare_exchange(STATE_UNINIT, STATE_RUNNING, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
        {
            // SAFETY: we are the sole writer (STATE_RUNNING guarantees exclusivity).
            unsafe { *self.value.get() = Some(factory) };
            self.state.store(STATE_COMPLETE, Ordering::Release);
        } else {
            debug_assert!(false, "factory already registered");
        }
    }

    pub fn get(&self) -> Option<T> {
        if self.state.load(Ordering::Acquire) == STATE_COMPLETE {
            // SAFETY: STATE_COMPLETE guarantees the write above is visible.
            unsafe { *self.value.get() }
        } else {
            None
        }
    }

    /// Asserts a factory is registered and returns it.
    ///
    /// # Panics
    /// Panics (`debug_assert!`) if no factory has been registered — calling
    /// `create()` before `register_*_factory()` is a programmer error.
    pub fn require(&self) -> T {
        match self.get() {
            Some(f) => f,
            None => {
                debug_assert!(false, "create() called before a factory was registered");
                #[cfg(feature = "assert-handler")]
                {
                    rtmech_containers::assert_handler::violate("create() called before a factory was registered")
                }
                #[cfg(not(feature = "assert-handler"))]
                {
                    panic!("no factory registered")
                }
            }
        }
    }

    #[cfg(test)]
    pub fn reset_for_test(&self) {
        self.state.store(STATE_UNINIT, Ordering::Release);
    }
}

impl<T: Copy + 'static> Default for FactorySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
