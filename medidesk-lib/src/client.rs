//! REST client for the MediDesk API

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use reqwest::Client;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use url::Url;

use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::Error;
use crate::identity::IdentityProvider;

/// The network collaborator every read and write goes through.
///
/// Cheap to clone (uses `Arc` internally) and safe to share across
/// tasks. Each request carries the current principal's bearer token and
/// tenant header when an identity provider is configured; without one,
/// requests go out unauthenticated.
///
/// A 401 from the server is treated as a global "session invalid"
/// signal, observable through [`session_invalidated`](Self::session_invalidated).
///
/// # Example
///
/// ```ignore
/// use medidesk_lib::RestClient;
/// use medidesk_lib::identity::StaticIdentity;
///
/// let client = RestClient::builder()
///     .base_url("https://api.medidesk.example")?
///     .identity(StaticIdentity::new(principal))
///     .build();
///
/// let response = client.get("patients").await?;
/// ```
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    base_url: Url,
    identity: Option<Arc<dyn IdentityProvider>>,
    http_client: Client,
    timeout: Option<Duration>,
    session_tx: watch::Sender<bool>,
}

/// Header carrying the tenant identifier on every authenticated call.
pub const TENANT_HEADER: &str = "X-Tenant-Id";

impl RestClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> RestClientBuilder<Missing> {
        RestClientBuilder::new()
    }

    /// Returns the base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns a receiver that flips to `false` when any request sees a
    /// 401.
    ///
    /// The consuming application watches this to redirect to login
    /// globally instead of handling 401 per operation.
    pub fn session_invalidated(&self) -> watch::Receiver<bool> {
        self.inner.session_tx.subscribe()
    }

    /// Issues a GET request.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// Issues a POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Issues a PUT request with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// Issues a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, Error> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse, Error> {
        let url = self
            .inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))?;

        let mut request = self.inner.http_client.request(method, url);

        if let Some(identity) = &self.inner.identity {
            if let Some(principal) = identity.principal().await {
                request = request
                    .bearer_auth(&principal.access_token)
                    .header(TENANT_HEADER, &principal.tenant_id);
            }
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.inner.timeout.unwrap_or(Duration::from_secs(30)))
            } else {
                ApiError::Network(e)
            }
        })?;

        let status = response.status();

        if status.as_u16() == 401 {
            warn!("401 from {path}, signalling invalid session");
            let _ = self.inner.session_tx.send(false);
            return Err(AuthError::SessionInvalid.into());
        }

        if status.as_u16() == 404 {
            return Err(ApiError::not_found(path).into());
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http(status.as_u16(), server_message(&body)).into());
        }

        let text = response.text().await.map_err(ApiError::Network)?;
        let body = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| ApiError::parse(format!("invalid JSON body: {e}")))?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Extracts the server's error message from a response body.
///
/// MediDesk endpoints report failures as `{"message": ...}` or
/// `{"error": ...}`; anything else falls through as the raw body.
fn server_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(message) = json.get(field).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}

/// A successful response from the API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code (2xx).
    pub status: u16,
    /// Parsed JSON body; `Null` for empty bodies.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Deserializes the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::parse(format!("unexpected response shape: {e}")).into())
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`RestClient`].
///
/// Uses the typestate pattern so the required `base_url` must be set
/// before `build` is available.
pub struct RestClientBuilder<U> {
    base_url: U,
    identity: Option<Arc<dyn IdentityProvider>>,
    timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl RestClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: Missing,
            identity: None,
            timeout: None,
            http_client: None,
        }
    }

    /// Sets the API base URL.
    ///
    /// Fails if the URL does not parse.
    pub fn base_url(self, url: impl AsRef<str>) -> Result<RestClientBuilder<Set<Url>>, Error> {
        let mut parsed = Url::parse(url.as_ref())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", url.as_ref())))?;
        // Url::join drops the last path segment without this.
        if !parsed.path().ends_with('/') {
            parsed.set_path(&format!("{}/", parsed.path()));
        }
        Ok(RestClientBuilder {
            base_url: Set(parsed),
            identity: self.identity,
            timeout: self.timeout,
            http_client: self.http_client,
        })
    }
}

impl Default for RestClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> RestClientBuilder<U> {
    /// Sets the identity provider used for header injection.
    ///
    /// Without one, requests proceed unauthenticated.
    pub fn identity<I: IdentityProvider + 'static>(mut self, provider: I) -> Self {
        self.identity = Some(Arc::new(provider));
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl RestClientBuilder<Set<Url>> {
    /// Builds the [`RestClient`].
    ///
    /// Only available once `base_url` has been set.
    pub fn build(self) -> RestClient {
        let http_client = self.http_client.unwrap_or_default();
        let (session_tx, _) = watch::channel(true);

        RestClient {
            inner: Arc::new(RestClientInner {
                base_url: self.base_url.0,
                identity: self.identity,
                http_client,
                timeout: self.timeout,
                session_tx,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_structured_fields() {
        assert_eq!(
            server_message(r#"{"message":"Appointment slot taken"}"#),
            "Appointment slot taken"
        );
        assert_eq!(server_message(r#"{"error":"Duplicate entry"}"#), "Duplicate entry");
        assert_eq!(server_message("plain text"), "plain text");
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let builder = RestClient::builder()
            .base_url("https://api.medidesk.example/v1")
            .unwrap();
        let client = builder.build();
        assert_eq!(client.base_url().as_str(), "https://api.medidesk.example/v1/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(RestClient::builder().base_url("not a url").is_err());
    }
}
