//! Inline circular double-ended queue, identical to [`FixedDeque`] except
//! for its iterator's equality semantics: comparing iterators from two
//! different `RingBuffer`s is a precondition violation (`debug_assert!`ed)
//! rather than a safely reported `false`, mirroring the source's deliberate
//! divergence between the two near-identical containers.
//!
//! [`FixedDeque`]: crate::fixed_deque::FixedDeque

use crate::ring_deque_impl::impl_ring_deque;

impl_ring_deque!(RingBuffer, RingBufferIter, get, eq_mode = debug_assert_eq);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behaves_like_fixed_deque_for_same_container_iterators() {
        let mut r: RingBuffer<i32, 5> = RingBuffer::new();
        r.assign_iter([1, 2, 3]).unwrap();
        let mut it = r.iter();
        let first = it.clone();
        it.next();
        assert!(first != it);
    }

    #[test]
    fn push_pop_wraps_indices() {
        let mut r: RingBuffer<i32, 4> = RingBuffer::new();
        for v in 0..3 {
            r.push_back(v).unwrap();
        }
        r.pop_front();
        r.pop_front();
        r.push_back(3).unwrap();
        r.push_back(4).unwrap();
        assert!(r.iter().copied().eq([2, 3, 4]));
    }
}
