pub mod classify;
mod client;
mod error;
mod http_client;
mod model;
#[cfg(test)]
pub(crate) mod testing;

pub use client::ApiClient;
pub use error::{ApiError, ErrorBody, ErrorKind, NO_DATA_MESSAGE, UNDECODABLE_ERROR_MESSAGE};
pub use http_client::{
    ApiRequest, HttpRequest, RawResponse, ReqwestTransport, RequestExecutor, Transport,
    TransportError,
};
pub use model::{AccessToken, Person, PersonUpdate, ResponseEntity};

/// Issues (GET) and revokes (DELETE) the access token.
pub const TOKEN_PATH: &str = "/api/v4/token";

/// Reads (GET) and updates (POST) the current person.
pub const ME_PATH: &str = "/api/v4/me";
