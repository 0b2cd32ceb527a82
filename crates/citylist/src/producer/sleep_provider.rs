use core::time::Duration;

/// Abstracts the per-item pacing delay of a producer.
///
/// The delay stands in for the I/O or computation a real unit of work would
/// cost. It is the only intentional suspension point in a work loop, and it
/// must not block other requests running on the same runtime.
pub trait SleepProvider {
    /// We require `Send` so the producer's future can move across threads.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for producers used by the servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(dur)
    }
}
