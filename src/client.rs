//! Visure API client.
//!
//! Low-level HTTP client that holds the bearer token and issues raw
//! requests against the authoring API. Endpoint functions live in
//! [`crate::rest`]; entity behavior lives on the model types.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{Result, VisureError};

/// Path of the authoring API below the server root.
pub const AUTHORING_API_PATH: &str = "visureauthoring8/api/v1/";
const USER_AGENT: &str = concat!("visureapi/", env!("CARGO_PKG_VERSION"));

/// Low-level Visure API client.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the token slot, so a token refresh is visible to every clone.
///
/// # Example
///
/// ```no_run
/// use visureapi::VisureClient;
///
/// # fn example() -> visureapi::Result<()> {
/// let client = VisureClient::new("https://visure.example.com", true)?;
/// assert!(client.api_url().as_str().ends_with("/visureauthoring8/api/v1/"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VisureClient {
    http: Client,
    api_url: Arc<Url>,
    token: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for VisureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisureClient")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl VisureClient {
    /// Create a client for the server at `server_url`.
    ///
    /// # Arguments
    ///
    /// * `server_url` - Server root (e.g., `https://visure.example.com`)
    /// * `verify_tls` - Whether to verify the server certificate
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(server_url: &str, verify_tls: bool) -> Result<Self> {
        // Ensure base URL ends with /
        let server_url = if server_url.ends_with('/') {
            server_url.to_string()
        } else {
            format!("{server_url}/")
        };

        let api_url = Url::parse(&server_url)?.join(AUTHORING_API_PATH)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(VisureError::HttpError)?;

        Ok(Self {
            http,
            api_url: Arc::new(api_url),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the authoring API root URL.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Whether a bearer token is currently set.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.api_url.join(path)?)
    }

    /// Attach the bearer token, send, and reject non-2xx statuses.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(VisureError::HttpError)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(VisureError::ApiError {
            message: error_message(status, &body),
            status_code: Some(status.as_u16()),
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(self.http.get(self.url(path)?)).await
    }

    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        self.send(self.http.get(self.url(path)?).query(query)).await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.send(self.http.put(self.url(path)?).json(body)).await
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.send(self.http.post(self.url(path)?).json(body)).await
    }

    /// POST without a body (logout).
    #[tracing::instrument(skip(self))]
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        self.send(self.http.post(self.url(path)?)).await
    }

    /// Decode a response body as JSON, mapping an empty body to `null`.
    pub async fn json_or_null(response: Response) -> Result<Value> {
        let body = response.text().await.map_err(VisureError::HttpError)?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Message for a failed call: the server's `message` or `error` field, the
/// raw body, or just the status when the body is empty.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["message", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
    });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => body.to_string(),
    }
}
