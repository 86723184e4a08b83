//! Bit-pattern synchronizer: threads wait for a combination of bits to be
//! set, producers set or clear bits.

extern crate alloc;
use alloc::boxed::Box;

use crate::error::{Error, Result};
use crate::once::FactorySlot;
use crate::timeout::Timeout;

pub type BitPattern = u32;

/// Whether a `wait` is satisfied by any one requested bit, or requires all
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    Or,
    And,
}

/// Whether a successful wait clears the bits it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    Auto,
    Manual,
}

pub trait EventFlag: Send + Sync {
    fn set(&self, pattern: BitPattern) -> Result<()>;
    fn reset(&self, pattern: BitPattern) -> Result<()>;
    fn current_pattern(&self) -> BitPattern;

    /// Blocks until `pattern`'s bits satisfy `mode`, returning the bits
    /// that were set at the moment the wait was released. Under
    /// [`ResetMode::Auto`] those bits are cleared atomically with release.
    fn wait(&self, pattern: BitPattern, mode: WaitMode, timeout: Timeout) -> Result<BitPattern>;

    fn set_all(&self) -> Result<()> {
        self.set(BitPattern::MAX)
    }

    fn reset_all(&self) -> Result<()> {
        self.reset(BitPattern::MAX)
    }

    fn set_one(&self, pos: u32) -> Result<()> {
        if pos >= BitPattern::BITS {
            return Err(Error::InvalidParameter);
        }
        self.set(1 << pos)
    }

    fn reset_one(&self, pos: u32) -> Result<()> {
        if pos >= BitPattern::BITS {
            return Err(Error::InvalidParameter);
        }
        self.reset(1 << pos)
    }

    fn wait_any(&self, timeout: Timeout) -> Result<BitPattern> {
        self.wait(BitPattern::MAX, WaitMode::Or, timeout)
    }

    fn wait_one(&self, pos: u32, timeout: Timeout) -> Result<BitPattern> {
        if pos >= BitPattern::BITS {
            return Err(Error::InvalidParameter);
        }
        self.wait(1 << pos, WaitMode::Or, timeout)
    }

    fn try_wait(&self, pattern: BitPattern, mode: WaitMode) -> Result<BitPattern> {
        if pattern == 0 {
            return Err(Error::InvalidParameter);
        }
        self.wait(pattern, mode, Timeout::Polling)
    }
}

pub trait EventFlagFactory: Sync {
    fn create(&self, initial_pattern: BitPattern, reset_mode: ResetMode) -> Option<Box<dyn EventFlag>>;
}

static EVENT_FLAG_FACTORY: FactorySlot<&'static dyn EventFlagFactory> = FactorySlot::new();

pub fn register_event_flag_factory(factory: &'static dyn EventFlagFactory) {
    log::debug!("event flag factory registered");
    EVENT_FLAG_FACTORY.register(factory);
}

pub fn create_event_flag(initial_pattern: BitPattern, reset_mode: ResetMode) -> Option<Box<dyn EventFlag>> {
    EVENT_FLAG_FACTORY.require().create(initial_pattern, reset_mode)
}

#[cfg(test)]
pub(crate) fn reset_event_flag_factory_for_test() {
    EVENT_FLAG_FACTORY.reset_for_test();
}
