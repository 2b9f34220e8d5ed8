use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use kabuka_cache::ttl::TtlCache;
use kabuka_core::common::time::FakeClockProvider;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, PartialEq, Eq)]
struct Payload {
    generation: usize,
}

fn setup() -> (Arc<FakeClockProvider>, Arc<TtlCache<Payload>>) {
    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ));
    let cache = Arc::new(TtlCache::new(Duration::from_secs(300), clock.clone()));
    (clock, cache)
}

async fn counted(counter: &AtomicUsize) -> Result<Payload, String> {
    let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Payload { generation })
}

#[tokio::test]
async fn test_hit_within_ttl_returns_same_payload() {
    let (clock, cache) = setup();
    let calls = AtomicUsize::new(0);

    let first = cache.get_or_refresh(|| counted(&calls)).await.unwrap();
    clock.advance(ChronoDuration::seconds(299));
    let second = cache.get_or_refresh(|| counted(&calls)).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expiry_triggers_exactly_one_recompute() {
    let (clock, cache) = setup();
    let calls = AtomicUsize::new(0);

    let first = cache.get_or_refresh(|| counted(&calls)).await.unwrap();
    // 恰好等于 TTL 时已过期
    clock.advance(ChronoDuration::seconds(300));
    let second = cache.get_or_refresh(|| counted(&calls)).await.unwrap();
    let third = cache.get_or_refresh(|| counted(&calls)).await.unwrap();

    assert_eq!(first.generation, 1);
    assert_eq!(second.generation, 2);
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_entry() {
    let (clock, cache) = setup();
    let calls = AtomicUsize::new(0);

    cache.get_or_refresh(|| counted(&calls)).await.unwrap();
    clock.advance(ChronoDuration::minutes(10));

    let err = cache
        .get_or_refresh(|| async { Err::<Payload, _>("upstream down".to_string()) })
        .await
        .unwrap_err();
    assert_eq!(err, "upstream down");

    let stale = cache.peek().unwrap();
    assert_eq!(stale.payload.generation, 1);
    assert!(cache.fresh().is_none());

    let recovered = cache.get_or_refresh(|| counted(&calls)).await.unwrap();
    assert_eq!(recovered.generation, 2);
}

#[tokio::test]
async fn test_concurrent_misses_share_one_computation() {
    let (_clock, cache) = setup();
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_refresh(|| async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    counted(&calls).await
                })
                .await
        }));
    }

    let mut payloads = Vec::new();
    for handle in handles {
        payloads.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(payloads.iter().all(|p| Arc::ptr_eq(p, &payloads[0])));
}

#[tokio::test]
async fn test_invalidate_and_force_refresh() {
    let (_clock, cache) = setup();
    let calls = AtomicUsize::new(0);

    assert!(cache.peek().is_none());
    cache.get_or_refresh(|| counted(&calls)).await.unwrap();

    cache.invalidate();
    assert!(cache.peek().is_none());
    let after_invalidate = cache.get_or_refresh(|| counted(&calls)).await.unwrap();
    assert_eq!(after_invalidate.generation, 2);

    let forced = cache.force_refresh(|| counted(&calls)).await.unwrap();
    assert_eq!(forced.generation, 3);
    assert_eq!(cache.fresh().unwrap().generation, 3);
}
