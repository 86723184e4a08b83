//! Process-wide precondition-violation hook, active under the
//! `"assert-handler"` feature.
//!
//! With the feature off, a precondition violation (out-of-bounds unchecked
//! index, malformed range) is an ordinary panic, as it always must be —
//! `Index::index` cannot return a `Result`. With the feature on, violations
//! are routed through a single registrable handler instead, for callers
//! that want one policy hook rather than scattered panics.

use core::sync::atomic::{AtomicUsize, Ordering};

pub type AssertHandler = fn(&str) -> !;

static HANDLER: AtomicUsize = AtomicUsize::new(0);

/// Registers the process-wide handler. Last writer wins; intended to be
/// called once during startup.
pub fn register_assert_handler(handler: AssertHandler) {
    HANDLER.store(handler as usize, Ordering::Release);
}

/// Reports a precondition violation. Dispatches to the registered handler
/// if one is set, otherwise panics with `message`.
#[cold]
pub fn violate(message: &str) -> ! {
    let raw = HANDLER.load(Ordering::Acquire);
    if raw != 0 {
        // SAFETY: the only values ever stored are `AssertHandler` function
        // pointers, via `register_assert_handler`.
        let handler: AssertHandler = unsafe { core::mem::transmute(raw) };
        handler(message)
    } else {
        panic!("{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(_message: &str) -> ! {
        panic!("handled")
    }

    #[test]
    #[should_panic(expected = "handled")]
    fn registered_handler_is_invoked() {
        register_assert_handler(handler);
        violate("boom");
    }
}
