//! Incremental delivery: emit each item as soon as it exists.
//!
//! ```text
//! NotStarted -> Streaming(1..=N) -> Closed-OK
//!                    |
//!                    v
//!             Closed-WithError
//! ```
//!
//! There is no rollback. Items handed to the [`Emitter`] are permanent, so a
//! cancellation observed after `k` items leaves the caller with exactly those
//! `k` items, in order, followed by the classified error.

use crate::{CancelSignal, Error, ProduceStatus, Producer, Result, check, terminal_error};
use tokio::sync::mpsc;

/// The delivery layer items are handed to, one at a time.
///
/// A failed emit is a transport problem, reported as
/// [`Error::TransportSend`], and is never reinterpreted as cancellation.
pub trait Emitter<T> {
    fn emit(&mut self, item: T) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Send> Emitter<T> for mpsc::Sender<T> {
    fn emit(&mut self, item: T) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.send(item).await.map_err(|e| Error::TransportSend {
                context: e.to_string(),
            })
        }
    }
}

/// Checks `signal`, produces one item, and emits it, until `producer` is
/// exhausted or a check fails.
///
/// Returns the number of items emitted. A producer with nothing to produce
/// returns `Ok(0)` without consulting `signal`.
///
/// # Errors
///
/// - The classified cancellation error when a check observes `signal` done.
///   Everything emitted before that stays emitted.
/// - The classified cancellation error when `signal` becomes done while an
///   emit is still waiting on the consumer. The pending item is not emitted.
/// - [`Error::TransportSend`] when `emitter` rejects an item. Delivery stops
///   immediately and is not retried.
pub async fn stream_to<S, P, E>(signal: &S, producer: &mut P, emitter: &mut E) -> Result<usize>
where
    S: CancelSignal + Sync + ?Sized,
    P: Producer,
    E: Emitter<P::Item>,
{
    let mut sent = 0;

    loop {
        let item = match producer.next_with(|| check(signal)).await {
            Ok(ProduceStatus::Ready { item }) => item,
            Ok(ProduceStatus::Exhausted) => return Ok(sent),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(sent, error = %e, "incremental delivery interrupted");
                return Err(e);
            }
        };

        // A consumer that stops reading must not hold the loop past the end
        // of the request.
        tokio::select! {
            biased;
            res = emitter.emit(item) => res?,
            () = signal.done() => {
                let e = terminal_error(signal);
                #[cfg(feature = "tracing")]
                tracing::debug!(sent, error = %e, "incremental delivery interrupted while emitting");
                return Err(e);
            }
        }
        sent += 1;
    }
}
