//! End-to-end scenarios driving the `std` reference backend through the
//! public `rtmech-oswrapper` API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rtmech_containers::intrusive_list::{IntrusiveList, IntrusiveNode, ListLink};
use rtmech_containers::ring_buffer::RingBuffer;
use rtmech_oswrapper::event_flag::{self, ResetMode, WaitMode};
use rtmech_oswrapper::fixed_memory_pool;
use rtmech_oswrapper::message_queue::MessageQueue;
use rtmech_oswrapper::mutex::{self, MutexAttribute};
use rtmech_oswrapper::timeout::Timeout;
use rtmech_oswrapper::variable_memory_pool;

fn setup() {
    rtmech_platform_std::init();
}

#[test]
fn ring_buffer_wraps_under_sustained_push_pop() {
    let mut rb: RingBuffer<u32, 4> = RingBuffer::new();
    for round in 0..10u32 {
        assert!(rb.push_back(round).is_ok());
        assert_eq!(rb.pop_front(), Some(round));
    }
    assert!(rb.push_back(1).is_ok());
    assert!(rb.push_back(2).is_ok());
    assert!(rb.push_back(3).is_ok());
    assert!(rb.push_back(4).is_err());
    assert!(rb.iter().copied().eq([1, 2, 3]));
}

struct Job {
    link: ListLink,
    id: u32,
}

impl Job {
    fn new(id: u32) -> Self {
        Self { link: ListLink::new(), id }
    }
}

unsafe impl IntrusiveNode for Job {
    fn link(&self) -> &ListLink {
        &self.link
    }
    unsafe fn from_link(link: std::ptr::NonNull<ListLink>) -> std::ptr::NonNull<Job> {
        link.cast()
    }
}

#[test]
fn intrusive_list_splice_preserves_order_and_ownership() {
    let a = Job::new(1);
    let b = Job::new(2);
    let c = Job::new(3);
    let mut pending: IntrusiveList<Job> = IntrusiveList::new();
    let mut done: IntrusiveList<Job> = IntrusiveList::new();
    pending.push_back(&a);
    pending.push_back(&b);
    pending.push_back(&c);

    done.splice_all(&mut pending);
    assert!(pending.is_empty());
    let ids: Vec<u32> = done.iter().map(|p| unsafe { p.as_ref().id }).collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[test]
fn mutex_is_recursive_for_the_owning_thread() {
    setup();
    let m = mutex::create_mutex(MutexAttribute::PriorityInherit).expect("mutex factory registered");
    m.lock().unwrap();
    m.lock().unwrap();
    m.unlock().unwrap();
    m.unlock().unwrap();
    assert!(m.unlock().is_err());
}

#[test]
fn event_flag_and_wait_blocks_until_all_bits_set() {
    setup();
    let flag = event_flag::create_event_flag(0, ResetMode::Manual).expect("event flag factory registered");
    let flag: Arc<dyn rtmech_oswrapper::event_flag::EventFlag> = Arc::from(flag);
    let flag2 = Arc::clone(&flag);

    let waiter = std::thread::spawn(move || flag2.wait(0b011, WaitMode::And, Timeout::Millis(2_000)));

    std::thread::sleep(std::time::Duration::from_millis(20));
    flag.set_one(0).unwrap();
    // Single bit set: the AND-wait must still be blocked.
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert!(!waiter.is_finished());

    flag.set_one(1).unwrap();
    let released = waiter.join().unwrap().unwrap();
    assert_eq!(released, 0b011);
}

#[test]
fn message_queue_send_blocks_when_full_until_receiver_drains() {
    setup();
    let pool = variable_memory_pool::create_variable_memory_pool(None, 4096).expect("pool factory registered");
    let queue: MessageQueue<u32> = MessageQueue::create(pool.as_ref(), 2).expect("queue created");

    queue.send(1, Timeout::Forever).unwrap();
    queue.send(2, Timeout::Forever).unwrap();
    assert!(queue.try_send(3).is_err());

    assert_eq!(queue.receive(Timeout::Forever).unwrap(), 1);
    queue.send(3, Timeout::Forever).unwrap();
    assert_eq!(queue.receive(Timeout::Forever).unwrap(), 2);
    assert_eq!(queue.receive(Timeout::Forever).unwrap(), 3);
}

#[test]
fn fixed_memory_pool_blocks_under_contention_then_unblocks_on_free() {
    setup();
    let pool: Arc<dyn fixed_memory_pool::FixedMemoryPool> =
        Arc::from(fixed_memory_pool::create_fixed_memory_pool(64, 1, None).expect("pool factory registered"));
    let first = pool.allocate().expect("sole block available");
    assert!(pool.allocate().is_none());

    let count = Arc::new(AtomicU32::new(0));
    let count2 = Arc::clone(&count);
    let pool2 = Arc::clone(&pool);
    let waiter = std::thread::spawn(move || {
        let got = pool2.allocate_memory(Timeout::Millis(2_000));
        count2.store(1, Ordering::Release);
        got
    });

    std::thread::sleep(std::time::Duration::from_millis(20));
    assert_eq!(count.load(Ordering::Acquire), 0);
    pool.deallocate(Some(first));

    let second = waiter.join().unwrap().expect("freed block became available");
    pool.deallocate(Some(second));
}
