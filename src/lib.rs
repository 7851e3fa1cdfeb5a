//! A client for the Extole consumer API.
//!
//! The API exposes two resources: an access token identifying the current
//! user, and the person (profile) behind that token. [`ApiClient`] acquires
//! and caches the token on demand, then uses it for every person request.

pub mod api;
pub mod auth;
pub mod config;

pub use api::{
    AccessToken, ApiClient, ApiError, ErrorKind, HttpRequest, Person, RawResponse,
    ReqwestTransport, RequestExecutor, Transport, TransportError,
};
pub use auth::TokenManager;
pub use config::{ClientConfig, ConfigError};
