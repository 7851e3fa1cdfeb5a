//! Turns a raw response into either a decoded entity or an [`ApiError`].
//!
//! Every endpoint goes through here, so the precedence rules live in one place:
//! a non-success status is always treated as an error, even when its body
//! would happen to decode as the success entity.

use reqwest::StatusCode;
use tracing::warn;

use super::{
    error::{ApiError, ErrorBody},
    http_client::RawResponse,
    model::ResponseEntity,
};

/// Decodes the success entity when the status is `success`,
/// and the error body otherwise.
pub fn decode<T: ResponseEntity>(
    response: RawResponse,
    success: StatusCode,
) -> Result<T, ApiError> {
    if response.status != success {
        return Err(classify_failure(response.status, response.body.as_deref()));
    }

    let Some(body) = response.body else {
        return Err(ApiError::empty_body(response.status.as_u16()));
    };

    // The body must both parse and carry the fields this endpoint always sends.
    match serde_json::from_str::<T>(&body) {
        Ok(mut entity) if entity.is_complete() => {
            entity.keep_raw_json(&body);
            Ok(entity)
        }
        Ok(_) => {
            warn!(status = %response.status, "Response is missing required fields");
            Err(ApiError::undecodable_response(response.status.as_u16(), &body))
        }
        Err(error) => {
            warn!(status = %response.status, %error, "Unable to decode response");
            Err(ApiError::undecodable_response(response.status.as_u16(), &body))
        }
    }
}

/// For endpoints answering with no content: any body sent alongside
/// the `success` status is ignored.
pub fn expect_empty(response: RawResponse, success: StatusCode) -> Result<(), ApiError> {
    if response.status == success {
        Ok(())
    } else {
        Err(classify_failure(response.status, response.body.as_deref()))
    }
}

/// Builds the error for a non-success status.
pub fn classify_failure(status: StatusCode, body: Option<&str>) -> ApiError {
    // A response did arrive, so an empty body is not a transport failure.
    // We keep the status so callers can still act on e.g. a bare 401.
    let Some(body) = body else {
        warn!(%status, "Error response carried no body");
        return ApiError::empty_body(status.as_u16());
    };

    // Anything else must be the API's own error shape.
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => ApiError::from_body(error_body).with_raw_body(body),
        Err(error) => {
            warn!(%status, %error, "Unable to decode error response");
            ApiError::undecodable_error(status.as_u16(), body)
        }
    }
}
