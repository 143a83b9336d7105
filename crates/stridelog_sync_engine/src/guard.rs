//! In-flight guard for synchronizers.

use crate::error::{SyncError, SyncResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// Marks a sync operation as in flight for its lifetime.
///
/// Running the same synchronizer twice concurrently risks double-creating a
/// record (both walks read the same dirty record before either stamps it),
/// so a second acquisition is rejected rather than queued.
pub(crate) struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool, operation: &'static str) -> SyncResult<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::SyncInProgress { operation });
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let flag = AtomicBool::new(false);

        let guard = InFlightGuard::acquire(&flag, "push").unwrap();
        let second = InFlightGuard::acquire(&flag, "push");
        assert!(matches!(
            second,
            Err(SyncError::SyncInProgress { operation: "push" })
        ));

        drop(guard);
        assert!(InFlightGuard::acquire(&flag, "push").is_ok());
    }
}
