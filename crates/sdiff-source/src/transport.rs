use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::error::{SourceError, SourceResult};

/// Fetches JSON documents from schema servers.
#[async_trait]
pub trait SchemaTransport: Send + Sync {
    /// GET `url` and decode the body as JSON.
    ///
    /// Unreachable hosts, non-success statuses and unparsable bodies all
    /// surface as [`SourceError::Retrieval`].
    async fn fetch_json(&self, url: &str) -> SourceResult<Value>;
}

/// HTTP basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Settings for [`HttpTransport`].
#[derive(Clone, Debug, Default)]
pub struct HttpOptions {
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub credentials: Option<Credentials>,
}

/// [`SchemaTransport`] over HTTP(S).
pub struct HttpTransport {
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    pub fn new(options: HttpOptions) -> SourceResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SourceError::Config(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| SourceError::Config(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Config(e.to_string()))?;

        Ok(Self {
            client,
            credentials: options.credentials,
        })
    }
}

#[async_trait]
impl SchemaTransport for HttpTransport {
    async fn fetch_json(&self, url: &str) -> SourceResult<Value> {
        debug!(url, "GET");
        let mut request = self.client.get(url);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| {
            SourceError::retrieval(url, e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::retrieval(
                url,
                Some(status.as_u16()),
                format!("server responded with {status}"),
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            SourceError::retrieval(url, Some(status.as_u16()), format!("invalid JSON body: {e}"))
        })
    }
}

/// [`SchemaTransport`] serving canned responses, for tests and offline replay.
///
/// Unknown URLs fail with a 404 retrieval error. Every request is recorded.
#[derive(Default)]
pub struct StaticTransport {
    routes: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, url: impl Into<String>, body: Value) -> Self {
        self.routes.insert(url.into(), body);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    /// How many times `url` has been requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|requested| *requested == url)
            .count()
    }
}

#[async_trait]
impl SchemaTransport for StaticTransport {
    async fn fetch_json(&self, url: &str) -> SourceResult<Value> {
        self.requests
            .lock()
            .expect("lock poisoned")
            .push(url.to_string());
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::retrieval(url, Some(404), "no such route"))
    }
}
