//! Archive HTTP client
//!
//! Every request goes to `base_url + api_base_path + endpoint`, negotiates
//! JSON and echoes the `csrftoken` cookie as `X-CSRFToken`. Failures are
//! posted to the [`NotificationCenter`] as a danger toast and then returned
//! to the caller.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::domain::entities::{SearchPage, SearchQuery};
use crate::domain::errors::ArchiveError;
use crate::ports::SearchApi;
use crate::services::notifications::NotificationCenter;

pub const DEFAULT_API_BASE_PATH: &str = "/api/v1";
pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER_NAME: &str = "X-CSRFToken";
pub const SESSION_COOKIE_NAME: &str = "sessionid";
pub const SEARCH_ENDPOINT: &str = "/charts/search/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shown to the user for any failed request
pub const REQUEST_FAILED_MESSAGE: &str = "API request failed";

/// Connection settings for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub api_base_path: String,
    pub timeout: Duration,
    /// Seeds the `csrftoken` cookie
    pub csrf_token: Option<String>,
    /// Seeds the `sessionid` cookie
    pub session_id: Option<String>,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_base_path: DEFAULT_API_BASE_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            csrf_token: None,
            session_id: None,
        }
    }

    pub fn with_api_base_path(mut self, path: impl Into<String>) -> Self {
        self.api_base_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Per-request options, merged over the client's defaults
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    /// Extra headers; they override the defaults on name clashes
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get()
        }
    }

    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

/// CSRF-aware JSON client for the archive API
pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    api_base_path: String,
    notifications: Arc<NotificationCenter>,
}

impl HttpClient {
    /// Create a new client; cookies from `config` are placed in the jar
    pub fn new(
        config: HttpClientConfig,
        notifications: Arc<NotificationCenter>,
    ) -> Result<Self, ArchiveError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ArchiveError::InvalidRequest(format!("bad base URL: {}", e)))?;

        let jar = Arc::new(Jar::default());
        if let Some(token) = &config.csrf_token {
            jar.add_cookie_str(&format!("{}={}; Path=/", CSRF_COOKIE_NAME, token), &base_url);
        }
        if let Some(session) = &config.session_id {
            jar.add_cookie_str(
                &format!("{}={}; Path=/", SESSION_COOKIE_NAME, session),
                &base_url,
            );
        }

        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ArchiveError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            jar,
            base_url,
            api_base_path: normalize_base_path(&config.api_base_path),
            notifications,
        })
    }

    /// Current anti-forgery token, or an empty string when the cookie is unset
    pub fn csrf_token(&self) -> String {
        self.jar
            .cookies(&self.base_url)
            .and_then(|header| header.to_str().ok().map(str::to_owned))
            .and_then(|cookies| cookie_value(&cookies, CSRF_COOKIE_NAME))
            .unwrap_or_default()
    }

    /// Issue a request and decode the JSON body
    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<serde_json::Value, ArchiveError> {
        self.request_json(endpoint, options).await
    }

    /// Issue a request and decode the JSON body into `T`
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ArchiveError> {
        match self.send(endpoint, options).await {
            Ok(value) => Ok(value),
            Err(err) => {
                error!(endpoint = %endpoint, error = %err, "API request failed");
                self.notifications.error(REQUEST_FAILED_MESSAGE);
                Err(err)
            }
        }
    }

    /// Fetch one page from the chart search endpoint
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ArchiveError> {
        let options = RequestOptions::get().with_query(query.to_pairs());
        self.request_json(SEARCH_ENDPOINT, options).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ArchiveError> {
        let url = self.endpoint_url(endpoint)?;
        let headers = self.merged_headers(&options.headers)?;

        debug!(method = %options.method, url = %url, "Sending archive request");

        let mut request = self
            .client
            .request(options.method, url)
            .headers(headers)
            .query(&options.query);
        if let Some(body) = &options.body {
            request = request.body(body.to_string());
        }

        let resp = request.send().await.map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ArchiveError::http(status.as_u16(), body));
        }

        let bytes = resp.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| ArchiveError::Decode(e.to_string()))
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ArchiveError> {
        let url = format!(
            "{}{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.api_base_path,
            endpoint
        );
        Url::parse(&url)
            .map_err(|e| ArchiveError::InvalidRequest(format!("bad endpoint {}: {}", endpoint, e)))
    }

    fn merged_headers(&self, extra: &[(String, String)]) -> Result<HeaderMap, ArchiveError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("x-csrftoken"),
            header_value(&self.csrf_token())?,
        );

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ArchiveError::InvalidRequest(format!("bad header {}: {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(headers)
    }
}

#[async_trait]
impl SearchApi for HttpClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ArchiveError> {
        HttpClient::search(self, query).await
    }
}

// ============================================
// Helper Functions
// ============================================

/// Find `name` in a `Cookie` header value (`a=1; b=2`)
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, ArchiveError> {
    HeaderValue::from_str(value)
        .map_err(|e| ArchiveError::InvalidRequest(format!("bad header value: {}", e)))
}

fn transport_error(err: reqwest::Error) -> ArchiveError {
    if err.is_timeout() {
        ArchiveError::Transport(format!("request timed out: {}", err))
    } else {
        ArchiveError::Transport(err.to_string())
    }
}
