//! Pool of equal-sized, non-allocating blocks.

extern crate alloc;
use alloc::boxed::Box;
use core::ptr::NonNull;

use crate::error::{Error, Result};
use crate::once::FactorySlot;
use crate::timeout::Timeout;

pub trait FixedMemoryPool: Send + Sync {
    /// Non-blocking; `None` if the pool is exhausted.
    fn allocate(&self) -> Option<NonNull<u8>>;

    /// `ptr == None` is a no-op, matching the source's null-pointer-safe
    /// `deallocate`.
    fn deallocate(&self, ptr: Option<NonNull<u8>>);

    fn block_size(&self) -> usize;

    /// Blocks (native condvar, or a backend-appropriate busy-poll yield if
    /// none is available) until a block may have become free, or the
    /// timeout elapses.
    fn wait_available(&self, timeout: Timeout) -> Result<()>;

    fn allocate_memory(&self, timeout: Timeout) -> Result<NonNull<u8>> {
        loop {
            if let Some(p) = self.allocate() {
                return Ok(p);
            }
            log::trace!("fixed memory pool exhausted, caller blocking");
            if timeout.is_polling() {
                return Err(Error::TimedOut);
            }
            self.wait_available(timeout)?;
        }
    }

    fn try_allocate_memory(&self) -> Result<NonNull<u8>> {
        self.allocate().ok_or(Error::TimedOut)
    }

    fn timed_allocate_memory(&self, timeout_millis: u32) -> Result<NonNull<u8>> {
        self.allocate_memory(Timeout::Millis(timeout_millis))
    }
}

/// Minimum backing size for a pool of `block_count` blocks of `block_size`
/// bytes, including the crate's internal free-list bookkeeping threaded
/// through each freed block.
pub const fn required_memory_size(block_size: usize, block_count: usize) -> usize {
    block_size * block_count
}

pub trait FixedMemoryPoolFactory: Sync {
    fn create(&self, block_size: usize, block_count: usize, memory: Option<NonNull<u8>>) -> Option<Box<dyn FixedMemoryPool>>;
}

static FIXED_POOL_FACTORY: FactorySlot<&'static dyn FixedMemoryPoolFactory> = FactorySlot::new();

pub fn register_fixed_memory_pool_factory(factory: &'static dyn FixedMemoryPoolFactory) {
    log::debug!("fixed memory pool factory registered");
    FIXED_POOL_FACTORY.register(factory);
}

pub fn create_fixed_memory_pool(
    block_size: usize,
    block_count: usize,
    memory: Option<NonNull<u8>>,
) -> Option<Box<dyn FixedMemoryPool>> {
    FIXED_POOL_FACTORY.require().create(block_size, block_count, memory)
}

#[cfg(test)]
pub(crate) fn reset_fixed_memory_pool_factory_for_test() {
    FIXED_POOL_FACTORY.reset_for_test();
}
