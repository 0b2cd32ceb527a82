//! The concrete per-request signal and the transport-side handle that drives
//! it.
//!
//! A [`ContextSource`] is created by the transport for each inbound call. It
//! hands out read-only [`RequestContext`]s to the work loop and is the only
//! thing that can move the request to done, either directly
//! ([`ContextSource::cancel`], [`ContextSource::expire`]) or by attaching a
//! trigger ([`ContextSource::expire_after`], [`ContextSource::cancel_when`]).
//!
//! The first termination recorded wins. Its reason is stored before the
//! underlying token fires, so a reader that observes done always observes the
//! final reason as well.

use super::{CancelReason, CancelSignal};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Shared {
    token: CancellationToken,
    reason: OnceLock<CancelReason>,
}

impl Shared {
    fn finish(&self, reason: CancelReason) -> bool {
        if self.reason.set(reason).is_err() {
            return false;
        }
        self.token.cancel();

        #[cfg(feature = "tracing")]
        tracing::trace!(%reason, "request context finished");

        true
    }
}

/// Read-only view of a request's cancellation state.
///
/// Cheap to clone. Every clone observes the same transition.
#[derive(Debug, Clone)]
pub struct RequestContext {
    shared: Arc<Shared>,
}

impl CancelSignal for RequestContext {
    fn is_done(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    fn reason(&self) -> CancelReason {
        self.shared.reason.get().copied().unwrap_or_default()
    }

    fn done(&self) -> impl Future<Output = ()> + Send {
        self.shared.token.cancelled()
    }
}

/// Transport-owned handle that decides when, and why, a request ends.
#[derive(Debug, Clone, Default)]
pub struct ContextSource {
    shared: Arc<Shared>,
}

impl ContextSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a read-only view for the work loop.
    pub fn context(&self) -> RequestContext {
        RequestContext {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Records that the caller abandoned the request.
    ///
    /// Returns `false` if the request had already ended, in which case the
    /// earlier reason is kept.
    pub fn cancel(&self) -> bool {
        self.shared.finish(CancelReason::Cancelled)
    }

    /// Records that the request's time budget elapsed.
    ///
    /// Returns `false` if the request had already ended.
    pub fn expire(&self) -> bool {
        self.shared.finish(CancelReason::DeadlineExceeded)
    }

    /// Expires the request once `timeout` has elapsed from now.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn expire_after(&self, timeout: Duration) {
        self.expire_at(Instant::now() + timeout);
    }

    /// Expires the request at `deadline`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn expire_at(&self, deadline: Instant) {
        self.finish_when(tokio::time::sleep_until(deadline), CancelReason::DeadlineExceeded);
    }

    /// Cancels the request once `trigger` resolves, e.g. when a response
    /// channel closes or the process starts shutting down.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn cancel_when<F>(&self, trigger: F)
    where
        F: Future + Send + 'static,
    {
        self.finish_when(trigger, CancelReason::Cancelled);
    }

    /// Binds the request's lifetime to the returned guard.
    ///
    /// Dropping the guard cancels the request if it is still live, which
    /// also releases any triggers still waiting on it.
    pub fn into_guard(self) -> ContextGuard {
        ContextGuard { source: self }
    }

    fn finish_when<F>(&self, trigger: F, reason: CancelReason)
    where
        F: Future + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = shared.token.cancelled() => {}
                _ = trigger => {
                    shared.finish(reason);
                }
            }
        });
    }
}

/// Cancels its request when dropped.
///
/// The transport holds this for the duration of a call. If the call's future
/// is dropped early (the peer reset the stream, or a transport timer fired),
/// work still running on behalf of the call observes `Cancelled` at its next
/// check.
#[derive(Debug)]
pub struct ContextGuard {
    source: ContextSource,
}

impl ContextGuard {
    pub fn context(&self) -> RequestContext {
        self.source.context()
    }

    pub fn source(&self) -> &ContextSource {
        &self.source
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.source.cancel();
    }
}
