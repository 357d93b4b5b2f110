//! Client-side resource cache
//!
//! Coordinates reads and writes against named resources so that
//! concurrent identical reads share one in-flight fetch, a successful
//! write invalidates the reads it affects, and user-facing notifications
//! fire exactly once per write.

mod config;
mod entry;
mod key;

pub use config::*;
pub use entry::*;
pub use key::*;

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;
use log::warn;
use tokio::sync::Mutex;

use crate::error::Error;
use crate::notify::Notification;
use crate::notify::NotificationSink;

/// The outcome of a cached read.
///
/// Failures never cross this boundary as `Err`: the caller observes the
/// entry status and an optional message. A failed refetch still carries
/// the previous data so the UI can keep showing it with an error
/// indicator.
#[derive(Debug, Clone)]
pub struct CacheRead<T> {
    /// The best available data: fresh, or the last good value.
    pub data: Option<T>,
    /// Status of the entry after this read.
    pub status: EntryStatus,
    /// Failure message if the fetch failed.
    pub error: Option<String>,
}

impl<T> CacheRead<T> {
    /// Returns `true` if the data is current.
    pub fn is_fresh(&self) -> bool {
        self.status == EntryStatus::Fresh
    }

    /// Returns `true` if the fetch failed.
    pub fn is_error(&self) -> bool {
        self.status == EntryStatus::Error
    }
}

/// The outcome of a write.
///
/// Like reads, write failures are reported rather than thrown: the form
/// that issued the write stays open and shows the message.
#[derive(Debug, Clone)]
pub enum WriteOutcome<T> {
    /// The mutator succeeded; dependent cache entries are now stale.
    Completed(T),
    /// The mutator failed; cache entries were left untouched.
    Failed {
        /// The collaborator's reported message, or a generic fallback.
        message: String,
    },
}

impl<T> WriteOutcome<T> {
    /// Returns `true` if the write succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns the result of a successful write.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// Returns the failure message, if the write failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { message } => Some(message),
        }
    }
}

/// A client-side cache of read results keyed by [`ResourceKey`].
///
/// Reads are deduplicated per key: concurrent reads for the same key
/// await one shared fetch instead of issuing duplicates. Writes
/// invalidate every entry of the written resource family, coarsely, so
/// the next read refetches. Entry data survives staleness and fetch
/// failures (stale-while-revalidate).
///
/// Writes are not queued against each other; two concurrent writes to
/// the same family may interleave and the next read observes whatever
/// the collaborator reports afterwards.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use medidesk_lib::cache::{ResourceCache, ResourceKey};
/// use medidesk_lib::notify::NullSink;
///
/// let cache: ResourceCache<Vec<Record>> = ResourceCache::new(Arc::new(NullSink));
/// let key = ResourceKey::new("patients");
///
/// let read = cache.read(&key, || client.list("patients")).await;
/// let outcome = cache.write("patients", || client.create(record)).await;
/// ```
pub struct ResourceCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
    config: CacheConfig,
    notifier: Arc<dyn NotificationSink>,
}

impl<T: Clone + Send + Sync + 'static> ResourceCache<T> {
    /// Creates a cache with the default configuration.
    pub fn new(notifier: Arc<dyn NotificationSink>) -> Self {
        Self::with_config(notifier, CacheConfig::default())
    }

    /// Creates a cache with the given configuration.
    pub fn with_config(notifier: Arc<dyn NotificationSink>, config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            inflight: DashMap::new(),
            config,
            notifier,
        }
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the status of the entry for `key`.
    pub fn status(&self, key: &ResourceKey) -> EntryStatus {
        self.entries
            .get(&key.cache_key())
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    /// Returns the cached data for `key` without fetching.
    ///
    /// Serves stale data too; this is what a view renders while a refetch
    /// is in flight.
    pub fn peek(&self, key: &ResourceKey) -> Option<T> {
        self.entries
            .get(&key.cache_key())
            .and_then(|entry| entry.data.clone())
    }

    /// Reads `key`, fetching through `fetcher` if the entry is absent,
    /// stale or errored.
    ///
    /// A fresh entry returns immediately without invoking the fetcher.
    /// Otherwise at most one fetch per key is in flight: concurrent reads
    /// await the same flight and then re-check the entry. Transient
    /// failures are retried up to the configured budget; a final failure
    /// is recorded on the entry and reported in the returned
    /// [`CacheRead`], leaving any prior data intact.
    pub async fn read<F, Fut>(&self, key: &ResourceKey, fetcher: F) -> CacheRead<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let cache_key = key.cache_key();

        if let Some(read) = self.fresh_hit(&cache_key) {
            debug!("cache hit for '{cache_key}'");
            return read;
        }

        // One guard per key; whoever holds it owns the fetch. Waiters
        // re-check the entry once the flight completes.
        let guard = self
            .inflight
            .entry(cache_key.clone())
            .or_default()
            .clone();
        let flight = guard.lock().await;

        if let Some(read) = self.fresh_hit(&cache_key) {
            debug!("cache hit for '{cache_key}' after awaiting in-flight fetch");
            return read;
        }

        debug!("cache miss for '{cache_key}', fetching");
        self.entries
            .entry(cache_key.clone())
            .or_default()
            .begin_fetch();

        let read = match self.fetch_with_retry(&cache_key, &fetcher).await {
            Ok(data) => {
                let mut entry = self.entries.entry(cache_key.clone()).or_default();
                entry.store(data);
                CacheRead {
                    data: entry.data.clone(),
                    status: entry.status,
                    error: None,
                }
            }
            Err(err) => {
                let message = err.user_message();
                warn!("fetch for '{cache_key}' failed: {err}");
                let mut entry = self.entries.entry(cache_key.clone()).or_default();
                entry.fail(message.clone());
                CacheRead {
                    data: entry.data.clone(),
                    status: entry.status,
                    error: Some(message),
                }
            }
        };

        // The guard has served its purpose; drop the map entry so keys
        // that are never read again do not pin a mutex forever. Waiters
        // still hold their own `Arc` clone of it.
        drop(flight);
        self.inflight.remove(&cache_key);
        read
    }

    /// Runs `mutator` against the collaborator and synchronizes the cache
    /// with the outcome.
    ///
    /// On success every entry of `family` is marked stale and one success
    /// notification fires. On failure the cache is left untouched and one
    /// destructive notification carries the collaborator's message (or a
    /// generic fallback).
    pub async fn write<M, Fut, R>(&self, family: &str, mutator: M) -> WriteOutcome<R>
    where
        M: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        match mutator().await {
            Ok(result) => {
                self.invalidate(family);
                self.notifier.notify(Notification::success(
                    "Saved",
                    format!("Changes to {family} have been saved"),
                ));
                WriteOutcome::Completed(result)
            }
            Err(err) => {
                let message = err.user_message();
                warn!("write to '{family}' failed: {err}");
                self.notifier
                    .notify(Notification::destructive("Something went wrong", message.clone()));
                WriteOutcome::Failed { message }
            }
        }
    }

    /// Marks every entry of `family` stale, regardless of parameter
    /// suffix.
    ///
    /// Entries mid-fetch are marked too: their flight may have read
    /// pre-write state, so its result must not be treated as fresh.
    pub fn invalidate(&self, family: &str) {
        let mut marked = 0usize;
        for mut entry in self.entries.iter_mut() {
            if ResourceKey::family_of(entry.key()) == family
                && matches!(entry.status, EntryStatus::Fresh | EntryStatus::Loading)
            {
                entry.mark_stale();
                marked += 1;
            }
        }
        debug!("invalidated {marked} cache entries for family '{family}'");
    }

    /// Removes every entry and any leftover in-flight guards.
    pub fn clear(&self) {
        self.entries.clear();
        self.inflight.clear();
    }

    fn fresh_hit(&self, cache_key: &str) -> Option<CacheRead<T>> {
        let entry = self.entries.get(cache_key)?;
        if !entry.status.needs_fetch() {
            Some(CacheRead {
                data: entry.data.clone(),
                status: entry.status,
                error: None,
            })
        } else {
            None
        }
    }

    async fn fetch_with_retry<F, Fut>(&self, cache_key: &str, fetcher: &F) -> Result<T, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt = 0u32;
        let mut delay = self.config.initial_delay;

        loop {
            match fetcher().await {
                Ok(data) => return Ok(data),
                Err(err) => {
                    let retryable = matches!(&err, Error::Api(api) if api.is_retryable());
                    if !retryable || attempt >= self.config.max_fetch_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    warn!(
                        "fetch for '{cache_key}' failed (attempt {attempt}), retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.config.max_delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::notify::NullSink;

    fn cache() -> ResourceCache<i32> {
        ResourceCache::with_config(Arc::new(NullSink), CacheConfig::no_retry())
    }

    #[tokio::test]
    async fn completed_flights_release_their_guards() {
        let cache = cache();

        cache.read(&ResourceKey::new("patients"), || async { Ok(7) }).await;
        cache
            .read(&ResourceKey::new("wards"), || async {
                Err::<i32, _>(Error::Api(ApiError::http(422, "bad ward")))
            })
            .await;

        assert_eq!(cache.len(), 2);
        assert!(cache.inflight.is_empty());
    }

    #[tokio::test]
    async fn clear_drops_guards_too() {
        let cache = cache();
        // Seed a guard directly; a crashed or cancelled flight could
        // leave one behind.
        cache.inflight.insert("patients".to_string(), Arc::default());

        cache.clear();
        assert!(cache.entries.is_empty());
        assert!(cache.inflight.is_empty());
    }
}
