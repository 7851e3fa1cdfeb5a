use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message used whenever a request produced no usable response.
pub const NO_DATA_MESSAGE: &str = "No data received from API request";

/// Message used when an error status carried a body we could not decode.
pub const UNDECODABLE_ERROR_MESSAGE: &str = "Could not decode JSON error message";

/// Where an [`ApiError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was obtained at all.
    Transport,
    /// A response arrived, but its body was missing or did not match the
    /// expected schema.
    Decode,
    /// A well-formed error returned by the API.
    Domain,
}

/// Every failure this client can report.
///
/// Domain errors carry the server's fields as received. Errors produced
/// locally get an `sdk`-prefixed `unique_id` so they can still be correlated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    unique_id: String,
    http_status_code: Option<u16>,
    error_code: Option<String>,
    message: String,
    raw_body: Option<String>,
}

/// The error body returned by the API on any non-success status.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

fn fallback_unique_id() -> String {
    format!("sdk{}", Uuid::new_v4())
}

impl ApiError {
    fn local(kind: ErrorKind, message: String) -> Self {
        Self {
            kind,
            unique_id: fallback_unique_id(),
            http_status_code: None,
            error_code: None,
            message,
            raw_body: None,
        }
    }

    /// Nothing came back from the API.
    pub fn no_data() -> Self {
        Self::local(ErrorKind::Transport, NO_DATA_MESSAGE.to_string())
    }

    /// A response that arrived with no body at all.
    pub fn empty_body(status: u16) -> Self {
        Self {
            http_status_code: Some(status),
            ..Self::local(ErrorKind::Decode, NO_DATA_MESSAGE.to_string())
        }
    }

    /// A success status whose body did not match the expected entity.
    pub fn undecodable_response(status: u16, raw_body: &str) -> Self {
        Self {
            http_status_code: Some(status),
            raw_body: Some(raw_body.to_string()),
            ..Self::local(
                ErrorKind::Decode,
                format!("Could not decode JSON response: {raw_body}"),
            )
        }
    }

    /// An error status whose body was not a valid error payload.
    pub fn undecodable_error(status: u16, raw_body: &str) -> Self {
        Self {
            http_status_code: Some(status),
            raw_body: Some(raw_body.to_string()),
            ..Self::local(ErrorKind::Decode, UNDECODABLE_ERROR_MESSAGE.to_string())
        }
    }

    /// Wraps an error body decoded from the API.
    pub fn from_body(body: ErrorBody) -> Self {
        Self {
            kind: ErrorKind::Domain,
            unique_id: body.unique_id.unwrap_or_else(fallback_unique_id),
            http_status_code: body.http_status_code,
            error_code: body.code,
            message: body.message,
            raw_body: None,
        }
    }

    /// Decodes a domain error from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let body: ErrorBody = serde_json::from_str(json)?;
        Ok(Self::from_body(body))
    }

    /// Encodes this error in the same shape the API uses.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_body())
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            unique_id: Some(self.unique_id.clone()),
            http_status_code: self.http_status_code,
            code: self.error_code.clone(),
            message: self.message.clone(),
        }
    }

    pub(crate) fn with_raw_body(mut self, raw_body: &str) -> Self {
        self.raw_body = Some(raw_body.to_string());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn http_status_code(&self) -> Option<u16> {
        self.http_status_code
    }

    /// The short machine-readable code, such as `invalid_program_domain`.
    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The undecoded response body, when one was received.
    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }
}
