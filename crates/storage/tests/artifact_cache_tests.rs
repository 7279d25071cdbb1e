//! Integration tests for the artifact cache:
//! - concurrent put/get from many tasks
//! - background sweeping with an injected clock
//! - deterministic shutdown

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use storage::{ArtifactCache, ArtifactCacheConfig, ManualClock};

fn payload(i: usize) -> Bytes {
    Bytes::from(format!("image-{}", i).into_bytes())
}

#[tokio::test]
async fn test_round_trip_returns_same_bytes() {
    let cache = ArtifactCache::new(Duration::from_secs(300));
    let image = Bytes::from(vec![0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
    let key = cache.put(image.clone()).await;
    assert_eq!(cache.get(&key).await, Some(image));
}

#[tokio::test]
async fn test_expiry_with_mocked_clock() {
    let clock = Arc::new(ManualClock::new());
    let cache = ArtifactCache::with_clock(Duration::from_secs(300), clock.clone());
    let key = cache.put(payload(0)).await;

    clock.advance(Duration::from_secs(299));
    assert!(cache.get(&key).await.is_some());

    clock.advance(Duration::from_secs(2));
    assert!(cache.get(&key).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_puts_yield_distinct_keys() {
    let cache = Arc::new(ArtifactCache::new(Duration::from_secs(300)));

    let tasks = (0..200).map(|i| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.put(payload(i)).await })
    });
    let keys: Vec<String> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let unique: HashSet<&String> = keys.iter().collect();
    assert_eq!(unique.len(), 200);
    assert_eq!(cache.len().await, 200);
    assert_eq!(cache.stats().entry_count.load(Ordering::Relaxed), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_gets_do_not_interfere() {
    let cache = Arc::new(ArtifactCache::new(Duration::from_secs(300)));
    let mut stored = Vec::new();
    for i in 0..50 {
        stored.push((cache.put(payload(i)).await, payload(i)));
    }

    let mut tasks = Vec::new();
    for (key, expected) in stored {
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            let expected = expected.clone();
            tasks.push(tokio::spawn(async move {
                assert_eq!(cache.get(&key).await, Some(expected));
            }));
        }
    }

    tokio::time::timeout(Duration::from_secs(10), join_all(tasks))
        .await
        .expect("concurrent gets should not deadlock")
        .into_iter()
        .for_each(|r| r.unwrap());

    assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_readers_and_writers() {
    let cache = Arc::new(ArtifactCache::new(Duration::from_secs(300)));
    let seed = cache.put(payload(0)).await;

    let writers = (1..=50).map(|i| {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            let key = cache.put(payload(i)).await;
            assert_eq!(cache.get(&key).await, Some(payload(i)));
        })
    });
    let readers = (0..50).map(|_| {
        let cache = Arc::clone(&cache);
        let seed = seed.clone();
        tokio::spawn(async move {
            assert_eq!(cache.get(&seed).await, Some(payload(0)));
        })
    });

    let all: Vec<_> = writers.chain(readers).collect();
    tokio::time::timeout(Duration::from_secs(10), join_all(all))
        .await
        .expect("mixed access should not deadlock")
        .into_iter()
        .for_each(|r| r.unwrap());

    assert_eq!(cache.len().await, 51);
}

#[tokio::test]
async fn test_sweeper_reclaims_without_reads() {
    let clock = Arc::new(ManualClock::new());
    let cache = ArtifactCache::with_clock(Duration::from_secs(60), clock.clone());
    cache.start_sweeper(Duration::from_millis(10));

    for i in 0..10 {
        cache.put(payload(i)).await;
    }
    assert_eq!(cache.len().await, 10);

    clock.advance(Duration::from_secs(61));

    let reclaimed = tokio::time::timeout(Duration::from_secs(5), async {
        while !cache.is_empty().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(reclaimed.is_ok(), "sweeper should drop expired entries");
    assert_eq!(cache.stats().swept.load(Ordering::Relaxed), 10);
    assert_eq!(cache.stats().size_bytes.load(Ordering::Relaxed), 0);

    cache.close().await;
}

#[tokio::test]
async fn test_close_stops_sweeper_promptly() {
    let cache = ArtifactCache::from_config(&ArtifactCacheConfig {
        ttl: Duration::from_secs(300),
        sweep_interval: Some(Duration::from_secs(3600)),
    });
    cache.put(payload(1)).await;

    tokio::time::timeout(Duration::from_secs(5), cache.close())
        .await
        .expect("close should not wait for the next sweep tick");
    assert!(cache.is_empty().await);
}

#[test]
fn test_default_config() {
    let config = ArtifactCacheConfig::default();
    assert_eq!(config.ttl, Duration::from_secs(300));
    assert_eq!(config.sweep_interval, Some(Duration::from_secs(60)));
}
