//! Conversions from transport failures into the normalized [`ApiError`].
//!
//! Everything that leaves the HTTP layer is an `ApiError`: transport errors
//! carry code `0` (or `408` for timeouts), non-success responses carry their
//! status plus whatever the server said in the body.

use gatehouse_common::StorageError;
use gatehouse_domain::{ApiError, GatehouseError};
use reqwest::StatusCode;
use serde_json::Value;

/// Longest plain-text body kept as an error message
const MAX_TEXT_MESSAGE: usize = 512;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

pub fn from_transport(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::timeout(format!("request timed out: {err}"));
    }
    if err.is_builder() {
        return ApiError::local(format!("invalid request: {err}"));
    }
    if err.is_decode() {
        return ApiError::local(format!("failed to decode response: {err}"));
    }
    // connect, request and body failures: no usable response arrived
    ApiError::network(format!("HTTP request failed: {err}"))
}

/* -------------------------------------------------------------------------- */
/* StorageError → ApiError */
/* -------------------------------------------------------------------------- */

/// Storage failures are local and fatal; they surface with code `0`.
pub fn from_storage(err: StorageError) -> ApiError {
    ApiError::from(GatehouseError::from(err))
}

/* -------------------------------------------------------------------------- */
/* status + body → ApiError */
/* -------------------------------------------------------------------------- */

/// Build the error for a non-success response.
///
/// A JSON body becomes `details`; its `message` (or `error`, or `detail`)
/// string becomes the message. Otherwise the body text, or the status reason
/// when the body is empty.
pub fn from_response(status: u16, body: &[u8]) -> ApiError {
    let parsed = serde_json::from_slice::<Value>(body).ok();

    let message = parsed
        .as_ref()
        .and_then(message_from_json)
        .or_else(|| text_message(body))
        .unwrap_or_else(|| reason(status));

    let err = ApiError::from_status(status, message);
    match parsed {
        Some(details) if !details.is_null() => err.with_details(details),
        _ => err,
    }
}

fn message_from_json(value: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

fn text_message(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_TEXT_MESSAGE).collect())
}

fn reason(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(|| format!("HTTP status {status}"), str::to_string)
}
