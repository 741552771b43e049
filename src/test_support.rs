//! Shared test-only helpers.

use std::sync::{Mutex, MutexGuard, OnceLock};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Serialise unit tests that engage a guard or write environment variables.
///
/// Guards share one process-wide engaged flag, so two such tests running in
/// parallel would see `AlreadyEngaged`. Poisoning is ignored: a panicking test
/// has already had its guard restore the environment during unwinding.
pub(crate) fn lock_test_env() -> MutexGuard<'static, ()> {
    match env_lock().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
