#![cfg_attr(not(test), no_std)]

//! Fixed-capacity, non-allocating containers: linear and circular
//! sequences plus an intrusive doubly-linked list. Nothing in this crate
//! ever calls an allocator.

pub mod assert_handler;
pub mod error;
pub mod fixed_deque;
pub mod fixed_vec;
pub mod intrusive_list;
pub mod pre_deque;
pub mod pre_vec;
mod raw;
mod ring_deque_impl;
pub mod ring_buffer;
pub mod ring_index;

pub use assert_handler::{register_assert_handler, AssertHandler};
pub use error::{ContainerError, Result};
pub use fixed_deque::{FixedDeque, FixedDequeIter};
pub use fixed_vec::FixedVec;
pub use intrusive_list::{IntrusiveList, IntrusiveNode, ListLink};
pub use pre_deque::{PreDeque, PreDequeIter};
pub use pre_vec::PreVec;
pub use ring_buffer::{RingBuffer, RingBufferIter};
