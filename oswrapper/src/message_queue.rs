//! Typed, bounded FIFO composed from a ring buffer, two serializing
//! mutexes, and two auto-reset event flags.
//!
//! At most one sender and one receiver can be unblocked at a time; the
//! ring itself is additionally guarded by its own mutex so a concurrent
//! `len()`-style inspection never races a push/pop.

extern crate alloc;
use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use rtmech_containers::ring_index::{distance_idx, next_idx};

use crate::error::{Error, Result};
use crate::event_flag::{self, EventFlag, ResetMode, WaitMode};
use crate::mutex::{self, Mutex, MutexAttribute};
use crate::timeout::Timeout;
use crate::variable_memory_pool::VariableMemoryPool;

/// A bounded, typed message queue. `max` is the usable capacity; the
/// backing ring reserves one extra slot internally.
pub struct MessageQueue<'a, T> {
    pool: &'a dyn VariableMemoryPool,
    buffer: NonNull<MaybeUninit<T>>,
    buf_len: usize,
    begin: UnsafeCell<usize>,
    end: UnsafeCell<usize>,
    rb_mutex: Box<dyn Mutex>,
    send_mutex: Box<dyn Mutex>,
    recv_mutex: Box<dyn Mutex>,
    not_empty: Box<dyn EventFlag>,
    not_full: Box<dyn EventFlag>,
}

// SAFETY: all mutable state (`buffer`, `begin`, `end`) is only touched
// while `rb_mutex` is held; the `Mutex`/`EventFlag` trait objects are
// themselves `Send + Sync`.
unsafe impl<T: Send> Send for MessageQueue<'_, T> {}
unsafe impl<T: Send> Sync for MessageQueue<'_, T> {}

impl<'a, T> MessageQueue<'a, T> {
    /// Allocates a queue of capacity `max` out of `pool`, plus its three
    /// mutexes and two event flags from the globally registered factories.
    /// On any failure, all partial resources are released before
    /// returning `None`.
    pub fn create(pool: &'a dyn VariableMemoryPool, max: usize) -> Option<Self> {
        let buf_len = max + 1;
        let bytes = buf_len * core::mem::size_of::<MaybeUninit<T>>();
        let raw = pool.allocate(bytes)?;
        let buffer = raw.cast::<MaybeUninit<T>>();

        let Some(rb_mutex) = mutex::create_mutex(MutexAttribute::PriorityInherit) else {
            pool.deallocate(Some(raw));
            return None;
        };
        let Some(send_mutex) = mutex::create_mutex(MutexAttribute::PriorityInherit) else {
            pool.deallocate(Some(raw));
            return None;
        };
        let Some(recv_mutex) = mutex::create_mutex(MutexAttribute::PriorityInherit) else {
            pool.deallocate(Some(raw));
            return None;
        };
        let Some(not_empty) = event_flag::create_event_flag(0, ResetMode::Auto) else {
            pool.deallocate(Some(raw));
            return None;
        };
        let Some(not_full) = event_flag::create_event_flag(1, ResetMode::Auto) else {
            pool.deallocate(Some(raw));
            return None;
        };

        Some(Self {
            pool,
            buffer,
            buf_len,
            begin: UnsafeCell::new(0),
            end: UnsafeCell::new(0),
            rb_mutex,
            send_mutex,
            recv_mutex,
            not_empty,
            not_full,
        })
    }

    fn slot(&self, idx: usize) -> *mut MaybeUninit<T> {
        // SAFETY: idx < buf_len by every caller's construction.
        unsafe { self.buffer.as_ptr().add(idx) }
    }

    /// Must be called with `rb_mutex` held.
    fn len_locked(&self) -> usize {
        let begin = unsafe { *self.begin.get() };
        let end = unsafe { *self.end.get() };
        distance_idx(begin, end, self.buf_len)
    }

    fn is_empty_locked(&self) -> bool {
        unsafe { *self.begin.get() == *self.end.get() }
    }

    fn is_full_locked(&self) -> bool {
        self.len_locked() == self.buf_len - 1
    }

    /// Sends `value`, blocking up to `timeout` while the queue is full.
    pub fn send(&self, value: T, timeout: Timeout) -> Result<()> {
        self.send_mutex.timed_lock(timeout)?;
        let result = (|| {
            loop {
                self.rb_mutex.lock()?;
                if !self.is_full_locked() {
                    break;
                }
                self.rb_mutex.unlock()?;
                log::trace!("message queue full, sender blocking");
                if timeout.is_polling() {
                    return Err(Error::TimedOut);
                }
                self.not_full.wait(1, WaitMode::Or, timeout)?;
            }
            let end = unsafe { *self.end.get() };
            // SAFETY: the slot at `end` is not live (ring invariant: [begin, end) is live).
            unsafe { (*self.slot(end)).write(value) };
            let new_end = next_idx(end, 1, self.buf_len);
            unsafe { *self.end.get() = new_end };
            let became_full = self.is_full_locked();
            self.rb_mutex.unlock()?;
            self.not_empty.set_all()?;
            if became_full {
                log::trace!("message queue became full");
                self.not_full.reset_all()?;
            }
            Ok(())
        })();
        self.send_mutex.unlock()?;
        result
    }

    pub fn try_send(&self, value: T) -> Result<()> {
        self.send(value, Timeout::Polling)
    }

    /// Receives the next message, blocking up to `timeout` while empty.
    pub fn receive(&self, timeout: Timeout) -> Result<T> {
        self.recv_mutex.timed_lock(timeout)?;
        let result = (|| {
            loop {
                self.rb_mutex.lock()?;
                if !self.is_empty_locked() {
                    break;
                }
                self.rb_mutex.unlock()?;
                log::trace!("message queue empty, receiver blocking");
                if timeout.is_polling() {
                    return Err(Error::TimedOut);
                }
                self.not_empty.wait(1, WaitMode::Or, timeout)?;
            }
            let begin = unsafe { *self.begin.get() };
            // SAFETY: slot `begin` is live (ring invariant).
            let value = unsafe { (*self.slot(begin)).assume_init_read() };
            let new_begin = next_idx(begin, 1, self.buf_len);
            unsafe { *self.begin.get() = new_begin };
            let became_empty = self.is_empty_locked();
            self.rb_mutex.unlock()?;
            self.not_full.set_all()?;
            if became_empty {
                log::trace!("message queue became empty");
                self.not_empty.reset_all()?;
            }
            Ok(value)
        })();
        self.recv_mutex.unlock()?;
        result
    }

    pub fn try_receive(&self) -> Result<T> {
        self.receive(Timeout::Polling)
    }
}

impl<T> Drop for MessageQueue<'_, T> {
    fn drop(&mut self) {
        let begin = unsafe { *self.begin.get() };
        let end = unsafe { *self.end.get() };
        let mut i = begin;
        while i != end {
            unsafe { (*self.slot(i)).assume_init_drop() };
            i = next_idx(i, 1, self.buf_len);
        }
        self.pool.deallocate(Some(self.buffer.cast::<u8>()));
    }
}
