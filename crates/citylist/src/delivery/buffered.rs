//! Buffered delivery: the whole result or a classified error, never a prefix.
//!
//! ```text
//! NotStarted -> Producing(1..=N) -> Complete
//!                    |                 ^
//!                    v                 | (final check passes)
//!                 Aborted <------ final check fails
//! ```
//!
//! The signal is checked before every item, so an early cancellation stops
//! the work instead of letting it run to the end, and once more after the
//! loop. The final check covers the window between the last item and the
//! point where the caller commits the response: a request that ended in that
//! window gets its error, not a stale success.

use crate::{CancelSignal, ProduceStatus, Producer, Result, check};

/// Produces every item from `producer` and returns them only if `signal`
/// stayed live throughout.
///
/// A producer with nothing to produce returns an empty list without
/// consulting `signal`.
///
/// # Errors
///
/// Returns the classified cancellation error as soon as any check observes
/// `signal` done. Items accumulated so far are dropped.
pub async fn collect<S, P>(signal: &S, producer: &mut P) -> Result<Vec<P::Item>>
where
    S: CancelSignal + Sync + ?Sized,
    P: Producer,
{
    let mut items = Vec::with_capacity(producer.remaining());

    loop {
        match producer.next_with(|| check(signal)).await {
            Ok(ProduceStatus::Ready { item }) => items.push(item),
            Ok(ProduceStatus::Exhausted) => break,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(discarded = items.len(), error = %e, "buffered delivery aborted");
                return Err(e);
            }
        }
    }

    if !items.is_empty() {
        if let Err(e) = check(signal) {
            #[cfg(feature = "tracing")]
            tracing::debug!(discarded = items.len(), error = %e, "buffered delivery aborted before commit");
            return Err(e);
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::testing::FlipAfter;
    use crate::{CancelReason, CityProducer, ContextSource, Error};
    use core::time::Duration;

    const PACING: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn returns_everything_when_live() {
        let source = ContextSource::new();
        let mut producer = CityProducer::new(49, PACING, 3);

        let cities = collect(&source.context(), &mut producer).await.unwrap();
        let ids: Vec<u32> = cities.iter().map(|c| c.id).collect();
        assert_eq!(ids, (1..=49).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_discards_nearly_complete_work() {
        let guard = ContextSource::new().into_guard();
        guard.source().expire_after(Duration::from_millis(2950));
        let mut producer = CityProducer::new(49, PACING, 3);

        let err = collect(&guard.context(), &mut producer).await.unwrap_err();
        assert_eq!(err, Error::DeadlineExceeded);
        // Checks at 0..=2900ms pass; the one at 3000ms sees the deadline.
        assert_eq!(producer.produced(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_work_at_next_check() {
        let source = ContextSource::new();
        let ctx = source.context();
        let canceller = {
            let source = source.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(450)).await;
                source.cancel();
            })
        };
        let mut producer = CityProducer::new(49, PACING, 3);

        let err = collect(&ctx, &mut producer).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err, Error::Cancelled);
        assert_eq!(producer.produced(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_produces_nothing() {
        let source = ContextSource::new();
        source.cancel();
        let mut producer = CityProducer::new(49, PACING, 3);

        let err = collect(&source.context(), &mut producer).await.unwrap_err();
        assert_eq!(err, Error::Cancelled);
        assert_eq!(producer.produced(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn final_check_rejects_stale_result() {
        // Live for the three per-item checks, done at the final one.
        let signal = FlipAfter::new(3, CancelReason::DeadlineExceeded);
        let mut producer = CityProducer::new(3, PACING, 3);

        let err = collect(&signal, &mut producer).await.unwrap_err();
        assert_eq!(err, Error::DeadlineExceeded);
        assert_eq!(producer.produced(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reasonless_termination_is_not_success() {
        let signal = FlipAfter::new(1, CancelReason::None);
        let mut producer = CityProducer::new(3, PACING, 3);

        let err = collect(&signal, &mut producer).await.unwrap_err();
        assert_eq!(err, Error::UnknownCancellation);
    }

    #[tokio::test]
    async fn empty_result_ignores_signal() {
        let source = ContextSource::new();
        source.expire();
        let mut producer = CityProducer::new(0, PACING, 3);

        let cities = collect(&source.context(), &mut producer).await.unwrap();
        assert!(cities.is_empty());
    }
}
