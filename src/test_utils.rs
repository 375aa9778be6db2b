//! Shared helpers for tests that deliver real signals.
//!
//! The SIGINT disposition is process-global and the test harness runs tests
//! on multiple threads, so every test that installs a handler or raises a
//! signal takes [`signal_lock`] first.

use std::sync::{Mutex, MutexGuard, PoisonError};

use nix::sys::signal::{self, Signal};

/// Serialize tests that touch the process signal state.
pub fn signal_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    init_logger();
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deliver SIGINT to the current thread, synchronously.
pub fn raise_sigint() {
    signal::raise(Signal::SIGINT).expect("raise SIGINT");
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
