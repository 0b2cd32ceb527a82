use super::emitter::StreamEmitter;
use citylist::{CityProducer, ContextGuard, delivery::incremental};
use citylist_tonic_core::{Error, proto::CityStream};
use std::time::Duration;
use tokio::sync::mpsc;
use tonic::Status;

/// How long a terminal status may wait for room in a full response stream.
pub const TERMINAL_STATUS_GRACE: Duration = Duration::from_secs(1);

/// Drives one `ListStream` call to completion.
///
/// Runs incremental delivery against the call's context and forwards each
/// city to `resp_tx`. If delivery stops early, the classified error is sent
/// as the final stream element so the caller sees the cities already sent
/// followed by a typed status.
///
/// # Arguments
///
/// - `guard`: The call's context. Dropped on return, which releases any
///   triggers still attached to it.
/// - `producer`: A fresh producer for this call.
/// - `resp_tx`: Channel backing the gRPC response stream.
///
/// # Behavior
///
/// - Returns the number of cities sent on success.
/// - On error, makes a best effort to surface the status to the client. The
///   client may already be gone or may have stopped reading; after
///   [`TERMINAL_STATUS_GRACE`] the status is dropped and only logged.
pub async fn feed_cities(
    guard: ContextGuard,
    mut producer: CityProducer,
    resp_tx: mpsc::Sender<Result<CityStream, Status>>,
) -> citylist_tonic_core::Result<usize> {
    let ctx = guard.context();
    let mut emitter = StreamEmitter::new(resp_tx.clone());

    match incremental::stream_to(&ctx, &mut producer, &mut emitter).await {
        Ok(sent) => Ok(sent),
        Err(e) => {
            let err = Error::from(e);
            match tokio::time::timeout(TERMINAL_STATUS_GRACE, resp_tx.send(Err(err.clone().into())))
                .await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!("Failed to forward terminal status: {e}"),
                Err(_) => tracing::debug!("Client stopped reading, dropping terminal status"),
            }
            Err(err)
        }
    }
}
