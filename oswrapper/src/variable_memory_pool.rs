//! Arbitrary-size allocation pool over a single caller- or OS-supplied
//! region. No particular fragmentation strategy is mandated; the reference
//! backend uses a first-fit free list (see `rtmech-platform-std`).

extern crate alloc;
use alloc::boxed::Box;
use core::ptr::NonNull;

use crate::once::FactorySlot;

pub trait VariableMemoryPool: Send + Sync {
    /// Non-blocking; `None` if no sufficiently large, correctly aligned
    /// region is currently free.
    fn allocate(&self, size: usize) -> Option<NonNull<u8>>;

    /// `ptr == None` is a no-op.
    fn deallocate(&self, ptr: Option<NonNull<u8>>);
}

pub trait VariableMemoryPoolFactory: Sync {
    fn create(&self, memory: Option<NonNull<u8>>, memory_size: usize) -> Option<Box<dyn VariableMemoryPool>>;
}

static VARIABLE_POOL_FACTORY: FactorySlot<&'static dyn VariableMemoryPoolFactory> = FactorySlot::new();

pub fn register_variable_memory_pool_factory(factory: &'static dyn VariableMemoryPoolFactory) {
    log::debug!("variable memory pool factory registered");
    VARIABLE_POOL_FACTORY.register(factory);
}

pub fn create_variable_memory_pool(
    memory: Option<NonNull<u8>>,
    memory_size: usize,
) -> Option<Box<dyn VariableMemoryPool>> {
    VARIABLE_POOL_FACTORY.require().create(memory, memory_size)
}

#[cfg(test)]
pub(crate) fn reset_variable_memory_pool_factory_for_test() {
    VARIABLE_POOL_FACTORY.reset_for_test();
}
