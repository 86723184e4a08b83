//! In-place construct/destroy helpers over `MaybeUninit` slots.
//!
//! These mirror the source's `Construct.h` placement-new / explicit-destructor
//! pair, expressed through `MaybeUninit` instead of raw placement new.

use core::mem::MaybeUninit;
use core::ptr;

/// Writes `value` into `slot`, treating it as previously uninitialized.
#[inline]
pub fn construct<T>(slot: &mut MaybeUninit<T>, value: T) {
    slot.write(value);
}

/// Drops the value in `slot` in place without deinitializing the storage's
/// bit pattern tracking (the caller is responsible for not touching `slot`
/// again until it is re-constructed).
///
/// # Safety
/// `slot` must currently hold a live, fully-initialized `T`.
#[inline]
pub unsafe fn destroy<T>(slot: &mut MaybeUninit<T>) {
    unsafe { ptr::drop_in_place(slot.as_mut_ptr()) };
}

/// Destroys every slot in `slots[range_start..range_end]` (raw indices, no wraparound).
///
/// # Safety
/// Every slot in the range must currently hold a live, initialized `T`.
#[inline]
pub unsafe fn destroy_range<T>(slots: &mut [MaybeUninit<T>], range_start: usize, range_end: usize) {
    for slot in &mut slots[range_start..range_end] {
        unsafe { destroy(slot) };
    }
}

/// Reports an unchecked-index precondition violation: an ordinary panic by
/// default, or a dispatch to the `"assert-handler"` feature's registered
/// handler when that feature is enabled.
macro_rules! precondition_failed {
    ($msg:expr) => {{
        #[cfg(feature = "assert-handler")]
        {
            $crate::assert_handler::violate($msg)
        }
        #[cfg(not(feature = "assert-handler"))]
        {
            panic!("{}", $msg)
        }
    }};
}
pub(crate) use precondition_failed;
