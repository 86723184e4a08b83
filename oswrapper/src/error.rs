//! Runtime-failure taxonomy shared by every OS-wrapper primitive.
//!
//! Precondition violations (calling `create()` before a factory is
//! registered, an out-of-range event-flag bit index used with the
//! unchecked accessor) are `debug_assert!`ed at the call site instead of
//! being folded into this enum — see the crate-level docs.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("operation timed out")]
    TimedOut,
    #[error("blocking operation invoked outside of a managed thread")]
    CalledByNonThread,
    #[error("invalid parameter")]
    InvalidParameter,
    #[error("mutex unlock attempted by a thread that does not hold it")]
    NotLocked,
    #[error("another thread is already waiting on this primitive")]
    OtherThreadWaiting,
    #[error("backend-specific failure")]
    OtherError,
}

pub type Result<T> = core::result::Result<T, Error>;
