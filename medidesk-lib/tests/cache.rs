//! Integration tests for the resource cache: read deduplication,
//! invalidation-on-write, retry bounds and notification behavior.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use medidesk_lib::cache::{CacheConfig, EntryStatus, ResourceCache, ResourceKey};
use medidesk_lib::error::{ApiError, Error};
use medidesk_lib::model::Record;
use medidesk_lib::notify::{ChannelSink, NotificationVariant, NullSink};

fn patients(names: &[&str]) -> Vec<Record> {
    names
        .iter()
        .map(|name| Record::new("patients").set("name", *name))
        .collect()
}

fn cache(config: CacheConfig) -> ResourceCache<Vec<Record>> {
    ResourceCache::with_config(Arc::new(NullSink), config)
}

#[tokio::test]
async fn concurrent_reads_share_one_fetch() {
    let cache = cache(CacheConfig::no_retry());
    let key = ResourceKey::new("patients");
    let calls = Arc::new(AtomicUsize::new(0));

    let fetcher = || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(patients(&["Rosa", "Ibrahim"]))
        }
    };

    let (first, second) = tokio::join!(cache.read(&key, fetcher), cache.read(&key, fetcher));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(first.is_fresh());
    assert!(second.is_fresh());
    assert_eq!(first.data.as_ref().map(Vec::len), Some(2));
    assert_eq!(second.data.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn fresh_entry_skips_the_fetcher() {
    let cache = cache(CacheConfig::no_retry());
    let key = ResourceKey::new("appointments");
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = calls.clone();
        let read = cache
            .read(&key, move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(patients(&["slot"]))
                }
            })
            .await;
        assert!(read.is_fresh());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn write_invalidates_the_whole_family() {
    let cache = cache(CacheConfig::no_retry());
    let all = ResourceKey::new("patients");
    let filtered = ResourceKey::new("patients").params("status=admitted");
    let other = ResourceKey::new("departments");

    cache.read(&all, || async { Ok(patients(&["Rosa"])) }).await;
    cache.read(&filtered, || async { Ok(patients(&["Rosa"])) }).await;
    cache.read(&other, || async { Ok(patients(&["Cardiology"])) }).await;

    let outcome = cache.write("patients", || async { Ok(()) }).await;
    assert!(outcome.is_success());

    // Coarse-grained: both patients keys are stale, departments untouched.
    assert_eq!(cache.status(&all), EntryStatus::Stale);
    assert_eq!(cache.status(&filtered), EntryStatus::Stale);
    assert_eq!(cache.status(&other), EntryStatus::Fresh);

    // Stale data stays servable until the refetch lands.
    assert!(cache.peek(&all).is_some());

    let read = cache
        .read(&all, || async { Ok(patients(&["Rosa", "Nils"])) })
        .await;
    assert!(read.is_fresh());
    assert_eq!(read.data.map(|d| d.len()), Some(2));
}

#[tokio::test]
async fn failed_write_leaves_entries_untouched() {
    let cache = cache(CacheConfig::no_retry());
    let key = ResourceKey::new("patients");

    cache.read(&key, || async { Ok(patients(&["Rosa"])) }).await;

    let outcome = cache
        .write("patients", || async {
            Err::<(), _>(Error::Api(ApiError::http(422, "Name is required")))
        })
        .await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.message(), Some("Name is required"));
    assert_eq!(cache.status(&key), EntryStatus::Fresh);
}

#[tokio::test]
async fn failed_fetch_keeps_prior_data() {
    let cache = cache(CacheConfig::no_retry());
    let key = ResourceKey::new("inventory");

    cache.read(&key, || async { Ok(patients(&["Gauze"])) }).await;
    cache.invalidate("inventory");

    let read = cache
        .read(&key, || async {
            Err(Error::Api(ApiError::http(400, "Bad filter")))
        })
        .await;

    assert!(read.is_error());
    assert_eq!(read.error.as_deref(), Some("Bad filter"));
    // The last good data is still reachable alongside the error.
    assert_eq!(read.data.map(|d| d.len()), Some(1));
    assert!(cache.peek(&key).is_some());

    // An errored entry retries on the next read.
    let read = cache
        .read(&key, || async { Ok(patients(&["Gauze", "Saline"])) })
        .await;
    assert!(read.is_fresh());
    assert_eq!(read.data.map(|d| d.len()), Some(2));
}

#[tokio::test]
async fn transient_failures_retry_within_budget() {
    let config = CacheConfig::default()
        .max_fetch_retries(1)
        .initial_delay(Duration::from_millis(1));
    let cache = cache(config);
    let key = ResourceKey::new("lab_orders");
    let calls = Arc::new(AtomicUsize::new(0));

    let read = cache
        .read(&key, || {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::Api(ApiError::http(503, "try later")))
                } else {
                    Ok(patients(&["CBC panel"]))
                }
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(read.is_fresh());
}

#[tokio::test]
async fn non_retryable_failures_do_not_retry() {
    let config = CacheConfig::default()
        .max_fetch_retries(3)
        .initial_delay(Duration::from_millis(1));
    let cache = cache(config);
    let key = ResourceKey::new("lab_orders");
    let calls = Arc::new(AtomicUsize::new(0));

    let read = cache
        .read(&key, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<Vec<Record>, _>(Error::Api(ApiError::http(422, "Invalid order")))
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(read.is_error());
}

#[tokio::test]
async fn write_notifications_fire_exactly_once() {
    let (sink, mut rx) = ChannelSink::new();
    let cache: ResourceCache<Vec<Record>> =
        ResourceCache::with_config(Arc::new(sink), CacheConfig::no_retry());

    cache.write("patients", || async { Ok(()) }).await;
    let notification = rx.try_recv().expect("success notification");
    assert_eq!(notification.variant, NotificationVariant::Success);
    assert!(rx.try_recv().is_err(), "exactly one notification per write");

    cache
        .write("patients", || async {
            Err::<(), _>(Error::Api(ApiError::http(409, "Bed already assigned")))
        })
        .await;
    let notification = rx.try_recv().expect("failure notification");
    assert_eq!(notification.variant, NotificationVariant::Destructive);
    assert_eq!(notification.description, "Bed already assigned");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn failure_without_server_message_gets_a_fallback() {
    let (sink, mut rx) = ChannelSink::new();
    let cache: ResourceCache<Vec<Record>> =
        ResourceCache::with_config(Arc::new(sink), CacheConfig::no_retry());

    cache
        .write("patients", || async {
            Err::<(), _>(Error::Api(ApiError::http(500, "")))
        })
        .await;

    let notification = rx.try_recv().expect("failure notification");
    assert_eq!(notification.variant, NotificationVariant::Destructive);
    assert!(!notification.description.is_empty());
}

#[tokio::test]
async fn clear_empties_the_cache() {
    let cache = cache(CacheConfig::no_retry());
    let key = ResourceKey::new("patients");

    cache.read(&key, || async { Ok(patients(&["Rosa"])) }).await;
    assert!(!cache.is_empty());

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.status(&key), EntryStatus::Idle);
}
