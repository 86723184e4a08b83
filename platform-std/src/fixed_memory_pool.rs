//! Fixed-block pool: a `Vec<usize>` free list of slot indices into an
//! over-aligned backing buffer, guarded by a condvar for the blocking
//! variants.

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;
use std::sync::{Condvar, Mutex as StdMutex};

use rtmech_oswrapper::error::Result;
use rtmech_oswrapper::fixed_memory_pool::{FixedMemoryPool, FixedMemoryPoolFactory};
use rtmech_oswrapper::timeout::Timeout;

/// Alignment guaranteed for an owned backing buffer, so a block handed
/// back to the caller is aligned for any scalar type per the pool's
/// invariant, not merely whatever the global allocator happens to give a
/// `u8` request.
const ALIGN: usize = core::mem::align_of::<u128>();

fn owned_layout(total: usize) -> Layout {
    Layout::from_size_align(total.max(1), ALIGN).expect("valid layout")
}

struct Inner {
    free: Vec<usize>,
}

pub struct StdFixedMemoryPoolImpl {
    block_size: usize,
    block_count: usize,
    base: *mut u8,
    owned: bool,
    inner: StdMutex<Inner>,
    cond: Condvar,
}

// SAFETY: `base` is either an allocation owned exclusively by this pool, or
// a caller-supplied pointer the caller promised is valid for the pool's
// lifetime; all slot bookkeeping goes through `inner`.
unsafe impl Send for StdFixedMemoryPoolImpl {}
unsafe impl Sync for StdFixedMemoryPoolImpl {}

impl StdFixedMemoryPoolImpl {
    fn new(block_size: usize, block_count: usize, memory: Option<NonNull<u8>>) -> Self {
        let total = block_size * block_count;
        let (base, owned) = match memory {
            Some(ptr) => (ptr.as_ptr(), false),
            None => {
                // SAFETY: `owned_layout` always has a non-zero size.
                let ptr = unsafe { alloc_zeroed(owned_layout(total)) };
                assert!(!ptr.is_null(), "fixed memory pool backing allocation failed");
                debug_assert_eq!(ptr as usize % ALIGN, 0);
                (ptr, true)
            }
        };
        Self {
            block_size,
            block_count,
            base,
            owned,
            inner: StdMutex::new(Inner { free: (0..block_count).collect() }),
            cond: Condvar::new(),
        }
    }
}

impl Drop for StdFixedMemoryPoolImpl {
    fn drop(&mut self) {
        if self.owned {
            let total = self.block_size * self.block_count;
            // SAFETY: `base` was allocated with this exact layout in `new`.
            unsafe { dealloc(self.base, owned_layout(total)) };
        }
    }
}

impl FixedMemoryPool for StdFixedMemoryPoolImpl {
    fn allocate(&self) -> Option<NonNull<u8>> {
        let mut guard = self.inner.lock().unwrap();
        let slot = guard.free.pop()?;
        // SAFETY: `slot` is a reserved, in-bounds block index.
        Some(unsafe { NonNull::new_unchecked(self.base.add(slot * self.block_size)) })
    }

    fn deallocate(&self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };
        let offset = (ptr.as_ptr() as usize) - (self.base as usize);
        let slot = offset / self.block_size;
        let mut guard = self.inner.lock().unwrap();
        guard.free.push(slot);
        drop(guard);
        self.cond.notify_all();
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn wait_available(&self, timeout: Timeout) -> Result<()> {
        let guard = self.inner.lock().unwrap();
        if !guard.free.is_empty() {
            return Ok(());
        }
        let _ = match timeout.as_millis() {
            None => self.cond.wait(guard).unwrap(),
            Some(ms) => self.cond.wait_timeout(guard, std::time::Duration::from_millis(ms as u64)).unwrap().0,
        };
        Ok(())
    }
}

pub struct StdFixedMemoryPoolFactory;

impl FixedMemoryPoolFactory for StdFixedMemoryPoolFactory {
    fn create(&self, block_size: usize, block_count: usize, memory: Option<NonNull<u8>>) -> Option<Box<dyn FixedMemoryPool>> {
        Some(Box::new(StdFixedMemoryPoolImpl::new(block_size, block_count, memory)))
    }
}
