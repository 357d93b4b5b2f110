//! Typed handle for one resource family
//!
//! Ties the REST client and the resource cache together: list reads go
//! through the cache (deduplicated, stale-while-revalidate), while
//! create/update/delete invalidate the family and raise the toast
//! notifications. This is the piece every dashboard page talks to.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use uuid::Uuid;

use crate::cache::CacheRead;
use crate::cache::ResourceCache;
use crate::cache::ResourceKey;
use crate::cache::WriteOutcome;
use crate::client::RestClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Record;

/// CRUD access to one resource family with cache synchronization.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use medidesk_lib::Resource;
///
/// let patients = Resource::new("patients", client.clone(), cache.clone());
///
/// let read = patients.list(None).await;
/// let outcome = patients.create(new_patient).await;
/// ```
#[derive(Clone)]
pub struct Resource {
    family: String,
    client: RestClient,
    cache: Arc<ResourceCache<Vec<Record>>>,
}

impl Resource {
    /// Creates a handle for the given resource family.
    ///
    /// The cache is shared: handles for different families over the same
    /// cache see each other's invalidations.
    pub fn new(
        family: impl Into<String>,
        client: RestClient,
        cache: Arc<ResourceCache<Vec<Record>>>,
    ) -> Self {
        Self {
            family: family.into(),
            client,
            cache,
        }
    }

    /// Returns the resource family this handle serves.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Lists records, optionally filtered by a serialized query string.
    ///
    /// Served from cache when fresh; otherwise fetched through the REST
    /// client, with concurrent identical lists sharing one request.
    pub async fn list(&self, params: Option<&str>) -> CacheRead<Vec<Record>> {
        let mut key = ResourceKey::new(&self.family);
        let mut path = self.family.clone();
        if let Some(params) = params {
            key = key.params(params);
            path = format!("{path}?{params}");
        }

        // The fetcher may run more than once (retries), so it captures
        // only copies of these borrows.
        let client = &self.client;
        let family = self.family.as_str();
        let path = path.as_str();
        self.cache
            .read(&key, move || async move {
                let response = client.get(path).await?;
                parse_records(family, response.body)
            })
            .await
    }

    /// Creates a record; on success the family's cached lists go stale.
    pub async fn create(&self, record: Record) -> WriteOutcome<Record> {
        let body = record.to_json();
        let client = &self.client;
        let family = self.family.as_str();
        let body = &body;
        // Once the server has applied the mutation the cached lists are
        // outdated, even if the success response body fails to parse.
        let applied = AtomicBool::new(false);
        let applied = &applied;
        let outcome = self
            .cache
            .write(family, move || async move {
                let response = client.post(family, body).await?;
                applied.store(true, Ordering::Relaxed);
                parse_record(family, response.body)
            })
            .await;
        if !outcome.is_success() && applied.load(Ordering::Relaxed) {
            self.cache.invalidate(family);
        }
        outcome
    }

    /// Updates the record with the given id.
    pub async fn update(&self, id: Uuid, record: Record) -> WriteOutcome<Record> {
        let body = record.to_json();
        let path = format!("{}/{id}", self.family);
        let client = &self.client;
        let family = self.family.as_str();
        let path = path.as_str();
        let body = &body;
        let applied = AtomicBool::new(false);
        let applied = &applied;
        let outcome = self
            .cache
            .write(family, move || async move {
                let response = client.put(path, body).await?;
                applied.store(true, Ordering::Relaxed);
                parse_record(family, response.body)
            })
            .await;
        if !outcome.is_success() && applied.load(Ordering::Relaxed) {
            self.cache.invalidate(family);
        }
        outcome
    }

    /// Deletes the record with the given id.
    pub async fn delete(&self, id: Uuid) -> WriteOutcome<()> {
        let path = format!("{}/{id}", self.family);
        let client = &self.client;
        let path = path.as_str();
        self.cache
            .write(&self.family, move || async move {
                client.delete(path).await?;
                Ok(())
            })
            .await
    }
}

/// Parses a list response body into records.
///
/// Accepts either a bare JSON array or an envelope with a `data` array.
fn parse_records(family: &str, body: serde_json::Value) -> Result<Vec<Record>, Error> {
    let items = match body {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("data") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(ApiError::parse("expected an array or a 'data' envelope").into());
            }
        },
        _ => return Err(ApiError::parse("expected an array response").into()),
    };

    items
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Object(map) => Ok(Record::from_json_object(family, map)),
            other => Err(ApiError::parse(format!(
                "expected an object in list response, got {other}"
            ))
            .into()),
        })
        .collect()
}

/// Parses a single-record response body.
///
/// An empty body (e.g. a 204 on update) yields an empty record.
fn parse_record(family: &str, body: serde_json::Value) -> Result<Record, Error> {
    match body {
        serde_json::Value::Null => Ok(Record::new(family)),
        serde_json::Value::Object(map) => Ok(Record::from_json_object(family, map)),
        _ => Err(ApiError::parse("expected an object response").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_records_accepts_bare_arrays_and_envelopes() {
        let bare = serde_json::json!([{ "name": "Rosa" }, { "name": "Nils" }]);
        assert_eq!(parse_records("patients", bare).unwrap().len(), 2);

        let envelope = serde_json::json!({ "data": [{ "name": "Rosa" }] });
        assert_eq!(parse_records("patients", envelope).unwrap().len(), 1);

        assert!(parse_records("patients", serde_json::json!("nope")).is_err());
    }

    #[test]
    fn parse_record_tolerates_empty_bodies() {
        let record = parse_record("patients", serde_json::Value::Null).unwrap();
        assert_eq!(record.resource(), "patients");
        assert!(record.fields().is_empty());
    }
}
