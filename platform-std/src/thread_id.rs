//! Stable per-OS-thread identity, used internally for mutex/event-flag
//! ownership bookkeeping. Every calling thread gets one, whether or not it
//! was spawned through [`crate::thread::StdThreadFactory`].

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THIS_THREAD_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

pub fn calling_thread_id() -> u64 {
    THIS_THREAD_ID.with(|cell| {
        if let Some(id) = cell.get() {
            id
        } else {
            let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
            cell.set(Some(id));
            id
        }
    })
}
