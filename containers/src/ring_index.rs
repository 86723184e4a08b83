//! Pure index arithmetic for circular buffers of `buf_len` slots.
//!
//! Every ring-shaped container (`FixedDeque`, `PreDeque`, `RingBuffer`)
//! reserves one extra slot so that `begin == end` is unambiguously empty;
//! `buf_len` is therefore `capacity + 1` throughout this module.

/// `i` advanced by `k` slots, wrapping modulo `buf_len`.
#[inline]
pub const fn next_idx(i: usize, k: usize, buf_len: usize) -> usize {
    (i + k) % buf_len
}

/// `i` retreated by `k` slots, wrapping modulo `buf_len`.
#[inline]
pub const fn prev_idx(i: usize, k: usize, buf_len: usize) -> usize {
    (i + buf_len - (k % buf_len)) % buf_len
}

/// Forward distance from `a` to `b`, i.e. how many `next_idx` steps reach `b` from `a`.
#[inline]
pub const fn distance_idx(a: usize, b: usize, buf_len: usize) -> usize {
    (b + buf_len - a) % buf_len
}
