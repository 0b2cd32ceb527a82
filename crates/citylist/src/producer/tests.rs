use crate::{
    City, CityProducer, Error, NAME_LEN, NameGenerator, ProduceStatus, Producer, ProducerConfig,
    SleepProvider,
};
use core::time::Duration;

/// Pacing that costs nothing, for tests that only care about ordering.
struct NoSleep;

impl SleepProvider for NoSleep {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        core::future::ready(())
    }
}

fn unpaced(count: u32) -> CityProducer<NoSleep> {
    CityProducer::with_sleep_provider(count, Duration::from_secs(3600), 42)
}

async fn drain<P: Producer>(producer: &mut P) -> Vec<P::Item> {
    let mut items = Vec::new();
    while let ProduceStatus::Ready { item } = producer.next_with(|| Ok(())).await.unwrap() {
        items.push(item);
    }
    items
}

#[tokio::test]
async fn assigns_ids_in_generation_order() {
    let mut producer = unpaced(49);
    assert_eq!(producer.remaining(), 49);

    let cities = drain(&mut producer).await;
    let ids: Vec<u32> = cities.iter().map(|c| c.id).collect();
    assert_eq!(ids, (1..=49).collect::<Vec<_>>());
    assert_eq!(producer.remaining(), 0);
    assert_eq!(producer.produced(), 49);
}

#[tokio::test]
async fn stays_exhausted() {
    let mut producer = unpaced(1);
    drain(&mut producer).await;

    for _ in 0..3 {
        let status = producer.next_with(|| Ok(())).await.unwrap();
        assert_eq!(status, ProduceStatus::Exhausted);
    }
}

#[tokio::test]
async fn empty_producer_never_checks() {
    let mut producer = unpaced(0);
    let status = producer
        .next_with(|| panic!("check must not run when nothing is left"))
        .await
        .unwrap();
    assert_eq!(status, ProduceStatus::Exhausted);
}

#[tokio::test]
async fn failed_check_does_not_advance() {
    let mut producer = unpaced(3);

    let first = producer.next_with(|| Ok(())).await.unwrap();
    assert!(matches!(first, ProduceStatus::Ready { item: City { id: 1, .. } }));

    let err = producer
        .next_with(|| Err(Error::DeadlineExceeded))
        .await
        .unwrap_err();
    assert_eq!(err, Error::DeadlineExceeded);
    assert_eq!(producer.produced(), 1);
    assert_eq!(producer.remaining(), 2);

    let next = producer.next_with(|| Ok(())).await.unwrap();
    assert!(matches!(next, ProduceStatus::Ready { item: City { id: 2, .. } }));
}

#[tokio::test(start_paused = true)]
async fn pays_pacing_once_per_item() {
    let mut producer = CityProducer::new(3, Duration::from_millis(100), 1);
    let start = tokio::time::Instant::now();

    drain(&mut producer).await;
    let paced = start.elapsed();
    assert!(paced >= Duration::from_millis(300) && paced < Duration::from_millis(305));

    // Exhaustion is free.
    producer.next_with(|| Ok(())).await.unwrap();
    assert_eq!(start.elapsed(), paced);
}

#[tokio::test(start_paused = true)]
async fn failed_check_skips_pacing() {
    let mut producer = CityProducer::new(3, Duration::from_millis(100), 1);
    let start = tokio::time::Instant::now();

    let _ = producer.next_with(|| Err(Error::Cancelled)).await;
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn same_seed_same_names() {
    let a = drain(&mut unpaced(10)).await;
    let b = drain(&mut unpaced(10)).await;
    assert_eq!(a, b);
}

#[test]
fn names_are_title_cased_letters() {
    let mut names = NameGenerator::from_seed(7);
    for _ in 0..100 {
        let name = names.next_name();
        assert_eq!(name.len(), NAME_LEN);

        let mut chars = name.chars();
        assert!(chars.next().unwrap().is_ascii_uppercase());
        assert!(chars.all(|c| c.is_ascii_lowercase()));
    }
}

#[test]
fn different_seeds_diverge() {
    let a: Vec<String> = {
        let mut g = NameGenerator::from_seed(1);
        (0..5).map(|_| g.next_name()).collect()
    };
    let b: Vec<String> = {
        let mut g = NameGenerator::from_seed(2);
        (0..5).map(|_| g.next_name()).collect()
    };
    assert_ne!(a, b);
}

#[test]
fn config_builds_fresh_producers() {
    let config = ProducerConfig {
        count: 5,
        pacing: Duration::from_millis(10),
        seed: Some(9),
    };
    let producer = config.build();
    assert_eq!(producer.remaining(), 5);
    assert_eq!(producer.produced(), 0);

    let unseeded = ProducerConfig::default().build();
    assert_eq!(unseeded.remaining(), 49);
}

#[cfg(feature = "serde")]
#[test]
fn city_serializes_as_flat_object() {
    let city = City {
        id: 3,
        name: "Bandung".into(),
    };
    let json = serde_json::to_string(&city).unwrap();
    assert_eq!(json, r#"{"id":3,"name":"Bandung"}"#);
}
