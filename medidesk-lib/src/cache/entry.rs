//! Cache entry state

use chrono::DateTime;
use chrono::Utc;

/// Lifecycle state of a cache entry.
///
/// `Idle → Loading → (Fresh | Error)`; a relevant write moves `Fresh` to
/// `Stale`. `Stale` behaves like `Idle` for the next read (it triggers a
/// refetch) but the last good data remains servable while the refetch is
/// in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryStatus {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// Data is current.
    Fresh,
    /// Data exists but a write invalidated it.
    Stale,
    /// The last fetch failed.
    Error,
}

impl EntryStatus {
    /// Returns `true` if a read in this state must invoke the fetcher.
    pub fn needs_fetch(self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// One cached read result.
///
/// `data` always holds the last successful fetch, even while the entry is
/// `Stale`, `Loading` or `Error`: failed or stale reads keep showing the
/// previous data alongside their status.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// Lifecycle state.
    pub status: EntryStatus,
    /// Last successful fetch result, if any.
    pub data: Option<T>,
    /// Message from the last failed fetch, if the status is `Error`.
    pub error: Option<String>,
    /// When `data` was last stored.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            status: EntryStatus::Idle,
            data: None,
            error: None,
            fetched_at: None,
        }
    }
}

impl<T> CacheEntry<T> {
    /// Creates an empty idle entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful fetch.
    ///
    /// If the entry was invalidated while the fetch was in flight it stays
    /// `Stale`: the stored data may predate the write that invalidated it,
    /// so the next read still refetches.
    pub fn store(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.fetched_at = Some(Utc::now());
        if self.status != EntryStatus::Stale {
            self.status = EntryStatus::Fresh;
        }
    }

    /// Records a failed fetch, keeping any prior data.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = EntryStatus::Error;
        self.error = Some(message.into());
    }

    /// Marks the entry stale after a relevant write.
    pub fn mark_stale(&mut self) {
        self.status = EntryStatus::Stale;
    }

    /// Marks a fetch as in flight, clearing any previous error.
    pub fn begin_fetch(&mut self) {
        self.status = EntryStatus::Loading;
        self.error = None;
    }
}
