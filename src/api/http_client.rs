use async_trait::async_trait;
use cookie_store::CookieStore;
use reqwest::{
    header::{self, HeaderMap, HeaderValue, InvalidHeaderValue},
    Method, StatusCode,
};
use reqwest_cookie_store::CookieStoreMutex;
use serde::Serialize;
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, warn};
use url::Url;

use super::{error::ApiError, model::AccessToken};
use crate::config::{ClientConfig, ConfigError};

/// Possible issues before a response is obtained.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("unable to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<TransportError> for ApiError {
    fn from(error: TransportError) -> Self {
        warn!(%error, "No response obtained from API");
        ApiError::no_data()
    }
}

/// A fully built request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Whatever the API sent back, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    /// `None` when the response carried no data.
    pub body: Option<String>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status,
            body: (!body.is_empty()).then_some(body),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }
}

/// The HTTP capability this client is built on.
///
/// [`ReqwestTransport`] is used by default; tests swap in their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request once. Any received response is returned as-is,
    /// whatever its status.
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;

    /// Drops a locally stored cookie for the given URL, if this transport keeps any.
    fn remove_cookie(&self, _url: &Url, _name: &str) {}
}

/// A [`Transport`] over `reqwest`, with its own cookie store.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    cookies: Arc<CookieStoreMutex>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let cookies = Arc::new(CookieStoreMutex::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .timeout(config.timeout())
            .user_agent(config.user_agent())
            .build()?;
        Ok(Self { client, cookies })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse::new(status, body))
    }

    fn remove_cookie(&self, url: &Url, name: &str) {
        let Ok(mut store) = self.cookies.lock() else {
            warn!(name, "Cookie store is poisoned; unable to remove cookie");
            return;
        };

        // The server may have scoped the cookie to any path or parent domain,
        // so we drop every cookie by that name which would be sent to `url`.
        let kept: Vec<_> = store
            .iter_any()
            .filter(|cookie| !(cookie.name() == name && cookie.matches(url)))
            .cloned()
            .map(Ok::<_, Infallible>)
            .collect();
        match CookieStore::from_cookies(kept, false) {
            Ok(rebuilt) => *store = rebuilt,
            Err(never) => match never {},
        }
        debug!(name, "Removed cookie");
    }
}

/// Builds requests against a single referral domain and dispatches them.
///
/// Decoding is left to the caller, so that success and error bodies
/// can be handled separately.
#[derive(Clone)]
pub struct RequestExecutor {
    referral_domain: String,
    transport: Arc<dyn Transport>,
}

impl RequestExecutor {
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            referral_domain: config.referral_domain().to_string(),
            transport,
        }
    }

    /// Starts a request for a path on the referral domain, such as `/api/v4/me`.
    pub fn request<'a>(&'a self, method: Method, path: &'a str) -> ApiRequest<'a> {
        ApiRequest {
            executor: self,
            method,
            path,
            token: None,
            body: None,
        }
    }

    /// The full URL for a path. Paths are appended verbatim.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", self.referral_domain, path))
    }

    pub(crate) fn remove_cookie(&self, path: &str, name: &str) {
        match self.url_for(path) {
            Ok(url) => self.transport.remove_cookie(&url, name),
            Err(error) => warn!(%error, name, "Unable to remove cookie"),
        }
    }
}

/// A single request in the middle of being built.
pub struct ApiRequest<'a> {
    executor: &'a RequestExecutor,
    method: Method,
    path: &'a str,
    token: Option<&'a AccessToken>,
    body: Option<Result<String, serde_json::Error>>,
}

impl<'a> ApiRequest<'a> {
    /// Authenticates the request as `Authorization: Bearer <token>`.
    pub fn bearer(mut self, token: &'a AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sends the given value as a JSON body.
    /// Serialization failures surface once the request is executed.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = Some(serde_json::to_string(body));
        self
    }

    /// Builds the final request without sending it.
    pub fn build(self) -> Result<HttpRequest, TransportError> {
        let url = self.executor.url_for(self.path)?;

        // We always ask for JSON, and only authorize when a token was given.
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.token {
            let authorization = HeaderValue::from_str(&format!("Bearer {}", token.value()))?;
            headers.insert(header::AUTHORIZATION, authorization);
        }

        // Any serialization failure from `json` surfaces here, before sending.
        let body = match self.body {
            Some(encoded) => {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                Some(encoded?)
            }
            None => None,
        };

        Ok(HttpRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }

    /// Dispatches the request once. There are no retries.
    pub async fn execute(self) -> Result<RawResponse, TransportError> {
        // We take the transport first, since `build` consumes the request.
        let transport = Arc::clone(&self.executor.transport);
        let request = self.build()?;

        debug!(method = %request.method, url = %request.url, "Making request");
        let response = transport.send(request).await?;
        debug!(status = %response.status, "Received response");
        Ok(response)
    }
}
