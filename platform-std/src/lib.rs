//! Reference `std`-backed implementation of every `rtmech-oswrapper`
//! factory trait. Exists so this workspace's own test suite has a
//! concrete backend to drive — not a production deployment target.

pub mod event_flag;
pub mod fixed_memory_pool;
pub mod mutex;
pub mod one_shot_timer;
pub mod periodic_timer;
pub mod thread;
mod thread_id;
pub mod variable_memory_pool;

use event_flag::StdEventFlagFactory;
use fixed_memory_pool::StdFixedMemoryPoolFactory;
use mutex::StdMutexFactory;
use one_shot_timer::StdOneShotTimerFactory;
use periodic_timer::StdPeriodicTimerFactory;
use thread::StdThreadFactory;
use variable_memory_pool::StdVariableMemoryPoolFactory;

static MUTEX_FACTORY: StdMutexFactory = StdMutexFactory;
static EVENT_FLAG_FACTORY: StdEventFlagFactory = StdEventFlagFactory;
static FIXED_POOL_FACTORY: StdFixedMemoryPoolFactory = StdFixedMemoryPoolFactory;
static VARIABLE_POOL_FACTORY: StdVariableMemoryPoolFactory = StdVariableMemoryPoolFactory;
static THREAD_FACTORY: StdThreadFactory = StdThreadFactory;
static PERIODIC_TIMER_FACTORY: StdPeriodicTimerFactory = StdPeriodicTimerFactory;
static ONE_SHOT_TIMER_FACTORY: StdOneShotTimerFactory = StdOneShotTimerFactory;
static INIT: std::sync::Once = std::sync::Once::new();

/// Registers every `rtmech-oswrapper` factory with this `std`-backed
/// implementation. Safe to call more than once (from multiple tests in the
/// same binary, for instance) — only the first call reaches the
/// underlying write-once `register_*_factory` calls.
pub fn init() {
    INIT.call_once(|| {
        rtmech_oswrapper::mutex::register_mutex_factory(&MUTEX_FACTORY);
        rtmech_oswrapper::event_flag::register_event_flag_factory(&EVENT_FLAG_FACTORY);
        rtmech_oswrapper::fixed_memory_pool::register_fixed_memory_pool_factory(&FIXED_POOL_FACTORY);
        rtmech_oswrapper::variable_memory_pool::register_variable_memory_pool_factory(&VARIABLE_POOL_FACTORY);
        rtmech_oswrapper::thread::register_thread_factory(&THREAD_FACTORY);
        rtmech_oswrapper::periodic_timer::register_periodic_timer_factory(&PERIODIC_TIMER_FACTORY);
        rtmech_oswrapper::one_shot_timer::register_one_shot_timer_factory(&ONE_SHOT_TIMER_FACTORY);
    });
}
