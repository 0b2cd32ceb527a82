use citylist::{City, delivery::incremental::Emitter};
use citylist_tonic_core::proto::CityStream;
use tokio::sync::mpsc;
use tonic::Status;

/// Sends each city to the gRPC response stream as its own message.
///
/// A send only fails once the response stream has been dropped, which is
/// reported as a transport error rather than a cancellation.
#[derive(Debug)]
pub struct StreamEmitter {
    tx: mpsc::Sender<Result<CityStream, Status>>,
}

impl StreamEmitter {
    pub fn new(tx: mpsc::Sender<Result<CityStream, Status>>) -> Self {
        Self { tx }
    }
}

impl Emitter<City> for StreamEmitter {
    fn emit(&mut self, city: City) -> impl Future<Output = citylist::Result<()>> + Send {
        async move {
            self.tx
                .send(Ok(city.into()))
                .await
                .map_err(|e| citylist::Error::TransportSend {
                    context: e.to_string(),
                })
        }
    }
}
