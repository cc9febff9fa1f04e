//! Response classification
//!
//! Every response body is one of: an `error` object, a `response` holding a
//! page of `items`, or a `response` holding some other value (a count, a
//! list of profiles). An `items` array of length zero is reported as
//! [`Classification::EmptyPage`], which is the natural end of most
//! paginated collections.

use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::types::JsonValue;

/// Successful response payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A page of items
    Page(Page),
    /// Any other response value (scalar count, object list, ...)
    Value(JsonValue),
}

/// Typed outcome of one call
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The call succeeded
    Success(Payload),
    /// The remote side returned an error object
    RemoteError {
        /// `error_code`
        code: i64,
        /// `error_msg`
        message: String,
    },
    /// The response carried an empty `items` array
    EmptyPage {
        /// `count` reported alongside the empty page, if any
        count: Option<u64>,
    },
}

/// Classify a decoded response body.
///
/// Remote error codes are not special-cased.
pub fn classify(body: JsonValue) -> Result<Classification> {
    if let Some(error) = body.get("error") {
        let code = error
            .get("error_code")
            .and_then(JsonValue::as_i64)
            .unwrap_or_default();
        let message = error
            .get("error_msg")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        return Ok(Classification::RemoteError { code, message });
    }

    let JsonValue::Object(mut map) = body else {
        return Err(Error::decode("response body is not an object"));
    };
    let response = map
        .remove("response")
        .ok_or_else(|| Error::decode("response body has neither response nor error"))?;

    match response.get("items").and_then(JsonValue::as_array) {
        Some(items) if items.is_empty() => Ok(Classification::EmptyPage {
            count: response.get("count").and_then(JsonValue::as_u64),
        }),
        Some(_) => Ok(Classification::Success(Payload::Page(Page::from_response(
            &response,
        )?))),
        None => Ok(Classification::Success(Payload::Value(response))),
    }
}
