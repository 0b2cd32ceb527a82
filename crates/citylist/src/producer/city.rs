use super::{NameGenerator, ProduceStatus, Producer, SleepProvider, TokioSleep};
use crate::Result;
use core::marker::PhantomData;
use core::time::Duration;

/// Number of cities produced per call unless configured otherwise.
pub const DEFAULT_CITY_COUNT: u32 = 49;

/// Pacing delay paid for each city unless configured otherwise.
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// A single produced city.
///
/// Ids are assigned `1..=N` in generation order, with no gaps or reuse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct City {
    pub id: u32,
    pub name: String,
}

/// Produces a fixed number of [`City`] records, one paced step at a time.
///
/// The pacing delay is paid *after* the caller's check passes and *before*
/// the city is returned. A cancellation that lands during the delay is
/// therefore observed at the next call, so the overshoot after a request ends
/// is bounded by one pacing interval.
#[derive(Debug)]
pub struct CityProducer<S = TokioSleep> {
    count: u32,
    produced: u32,
    pacing: Duration,
    names: NameGenerator,
    _sleep: PhantomData<fn() -> S>,
}

impl CityProducer {
    /// Creates a producer paced with the Tokio timer.
    pub fn new(count: u32, pacing: Duration, seed: u64) -> Self {
        Self::with_sleep_provider(count, pacing, seed)
    }
}

impl<S: SleepProvider> CityProducer<S> {
    /// Creates a producer paced by `S`.
    pub fn with_sleep_provider(count: u32, pacing: Duration, seed: u64) -> Self {
        Self {
            count,
            produced: 0,
            pacing,
            names: NameGenerator::from_seed(seed),
            _sleep: PhantomData,
        }
    }

    /// Number of cities produced so far.
    pub fn produced(&self) -> u32 {
        self.produced
    }
}

impl<S: SleepProvider> Producer for CityProducer<S> {
    type Item = City;

    fn remaining(&self) -> usize {
        (self.count - self.produced) as usize
    }

    fn next_with<F>(&mut self, check: F) -> impl Future<Output = Result<ProduceStatus<City>>> + Send
    where
        F: FnOnce() -> Result<()> + Send,
    {
        async move {
            if self.produced >= self.count {
                return Ok(ProduceStatus::Exhausted);
            }
            check()?;

            S::sleep_for(self.pacing).await;

            self.produced += 1;
            let city = City {
                id: self.produced,
                name: self.names.next_name(),
            };

            #[cfg(feature = "tracing")]
            tracing::trace!(id = city.id, "produced city");

            Ok(ProduceStatus::Ready { item: city })
        }
    }
}

/// Per-call producer parameters, typically derived from server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerConfig {
    pub count: u32,
    pub pacing: Duration,
    /// Fixed name seed. When `None`, each producer draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_CITY_COUNT,
            pacing: DEFAULT_PACING,
            seed: None,
        }
    }
}

impl ProducerConfig {
    /// Builds a fresh producer for one call.
    pub fn build(&self) -> CityProducer {
        let seed = self.seed.unwrap_or_else(rand::random);
        CityProducer::new(self.count, self.pacing, seed)
    }
}
