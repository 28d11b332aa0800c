use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock a cache slot, recovering the guard if a previous holder panicked.
///
/// A panic mid-update can leave a slot half merged, so the recovered state is
/// reset to its default before being handed out.
pub(crate) fn mutex_lock<'a, T: Default>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "mutex.lock",
                result = "poisoned_reset",
                hint = "slot was cleared after panic in another thread",
                "Recovered from poisoned cache lock"
            );
            lock.clear_poison();
            let mut guard = poisoned.into_inner();
            *guard = T::default();
            guard
        }
    }
}
