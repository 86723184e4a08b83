//! Variable-size pool: a first-fit free list of `(offset, size)` runs over
//! a single backing buffer.

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;
use std::sync::Mutex as StdMutex;

use rtmech_oswrapper::variable_memory_pool::{VariableMemoryPool, VariableMemoryPoolFactory};

const ALIGN: usize = core::mem::align_of::<u128>();

fn align_up(n: usize) -> usize {
    (n + ALIGN - 1) & !(ALIGN - 1)
}

fn owned_layout(total: usize) -> Layout {
    Layout::from_size_align(total.max(1), ALIGN).expect("valid layout")
}

struct FreeRun {
    offset: usize,
    size: usize,
}

struct Inner {
    free: Vec<FreeRun>,
    allocated: std::collections::HashMap<usize, usize>,
}

pub struct StdVariableMemoryPoolImpl {
    base: *mut u8,
    total: usize,
    owned: bool,
    inner: StdMutex<Inner>,
}

// SAFETY: all access to `base` is mediated by `inner`'s free-list bookkeeping.
unsafe impl Send for StdVariableMemoryPoolImpl {}
unsafe impl Sync for StdVariableMemoryPoolImpl {}

impl StdVariableMemoryPoolImpl {
    fn new(memory: Option<NonNull<u8>>, memory_size: usize) -> Self {
        let (base, owned) = match memory {
            Some(ptr) => (ptr.as_ptr(), false),
            None => {
                // SAFETY: `owned_layout` always has a non-zero size.
                let ptr = unsafe { alloc_zeroed(owned_layout(memory_size)) };
                assert!(!ptr.is_null(), "variable memory pool backing allocation failed");
                debug_assert_eq!(ptr as usize % ALIGN, 0);
                (ptr, true)
            }
        };
        Self {
            base,
            total: memory_size,
            owned,
            inner: StdMutex::new(Inner {
                free: vec![FreeRun { offset: 0, size: memory_size }],
                allocated: std::collections::HashMap::new(),
            }),
        }
    }
}

impl Drop for StdVariableMemoryPoolImpl {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: `base` was allocated with this exact layout in `new`.
            unsafe { dealloc(self.base, owned_layout(self.total)) };
        }
    }
}

impl VariableMemoryPool for StdVariableMemoryPoolImpl {
    fn allocate(&self, size: usize) -> Option<NonNull<u8>> {
        let size = align_up(size.max(1));
        let mut guard = self.inner.lock().unwrap();
        let (idx, run_offset, run_size) = guard
            .free
            .iter()
            .enumerate()
            .find(|(_, run)| run.size >= size)
            .map(|(i, run)| (i, run.offset, run.size))?;

        if run_size == size {
            guard.free.remove(idx);
        } else {
            guard.free[idx].offset += size;
            guard.free[idx].size -= size;
        }
        guard.allocated.insert(run_offset, size);
        // SAFETY: run_offset..run_offset+size lies within [0, total) by the
        // free-list invariant.
        Some(unsafe { NonNull::new_unchecked(self.base.add(run_offset)) })
    }

    fn deallocate(&self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };
        let offset = (ptr.as_ptr() as usize) - (self.base as usize);
        let mut guard = self.inner.lock().unwrap();
        let Some(size) = guard.allocated.remove(&offset) else {
            return;
        };
        guard.free.push(FreeRun { offset, size });
        guard.free.sort_by_key(|r| r.offset);
        let mut merged: Vec<FreeRun> = Vec::with_capacity(guard.free.len());
        for run in guard.free.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.offset + last.size == run.offset {
                    last.size += run.size;
                    continue;
                }
            }
            merged.push(run);
        }
        guard.free = merged;
    }
}

pub struct StdVariableMemoryPoolFactory;

impl VariableMemoryPoolFactory for StdVariableMemoryPoolFactory {
    fn create(&self, memory: Option<NonNull<u8>>, memory_size: usize) -> Option<Box<dyn VariableMemoryPool>> {
        Some(Box::new(StdVariableMemoryPoolImpl::new(memory, memory_size)))
    }
}
