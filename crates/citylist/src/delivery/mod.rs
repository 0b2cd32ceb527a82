//! Delivery strategies over a [`Producer`](crate::Producer).
//!
//! Both strategies run the same check-before-produce loop and differ only in
//! what happens to already-produced items when a check fails:
//!
//! - [`buffered`] - nothing is observable until the end; a failed check
//!   discards everything.
//! - [`incremental`] - each item is emitted as soon as it exists; a failed
//!   check leaves the emitted prefix in place and ends with an error.

pub mod buffered;
pub mod incremental;

#[cfg(test)]
pub(crate) mod testing {
    use crate::{CancelReason, CancelSignal};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports live for the first `live_checks` liveness queries, then done.
    pub(crate) struct FlipAfter {
        pub(crate) live_checks: usize,
        pub(crate) reason: CancelReason,
        pub(crate) seen: AtomicUsize,
    }

    impl FlipAfter {
        pub(crate) fn new(live_checks: usize, reason: CancelReason) -> Self {
            Self {
                live_checks,
                reason,
                seen: AtomicUsize::new(0),
            }
        }
    }

    impl CancelSignal for FlipAfter {
        fn is_done(&self) -> bool {
            self.seen.fetch_add(1, Ordering::SeqCst) >= self.live_checks
        }

        fn reason(&self) -> CancelReason {
            self.reason
        }

        fn done(&self) -> impl Future<Output = ()> + Send {
            core::future::pending()
        }
    }
}
