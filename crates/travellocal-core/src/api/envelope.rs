//! Response envelope handling.
//!
//! Every backend response is `{status, data}` with list payloads either
//! directly in `data` or paged under `data.content`. Some list endpoints
//! return a bare array instead.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::text::truncate_chars;

pub const STATUS_OK: &str = "OK";
pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_CONTINUE: &str = "100 CONTINUE";

const ERROR_BODY_PREVIEW_CHARS: usize = 180;

/// Items of a list response.
///
/// Picks the first present of `data.content`, `data`, or the body itself; the
/// pick must be an array, anything else yields an empty list.
pub fn unwrap_list(body: &Value) -> Vec<Value> {
    let data = present(body.get("data"));
    let picked = data
        .and_then(|data| present(data.get("content")))
        .or(data)
        .or_else(|| present(Some(body)));
    picked
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// The `data` object of a detail response, or the body when it is already
/// the record.
pub fn unwrap_detail(body: &Value) -> Option<&Value> {
    match present(body.get("data")) {
        Some(data) => data.is_object().then_some(data),
        None if body.get("status").is_none() => body.is_object().then_some(body),
        None => None,
    }
}

pub fn envelope_status(body: &Value) -> Option<&str> {
    body.get("status").and_then(Value::as_str)
}

/// Fails with `ServerRejected` unless the envelope status is one of `accepted`.
pub fn ensure_status(body: &Value, accepted: &[&str]) -> Result<()> {
    let status = envelope_status(body);
    if status.is_some_and(|status| accepted.contains(&status)) {
        return Ok(());
    }
    let message = envelope_message(body).unwrap_or_else(|| match status {
        Some(status) => format!("Server responded with status {status}"),
        None => "Server response did not include a status".to_string(),
    });
    Err(Error::ServerRejected {
        status: status.map(ToString::to_string),
        message,
    })
}

/// `message`, then `error`, from an envelope body.
pub fn envelope_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(ToString::to_string)
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Message for a non-2xx response body.
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = payload
            .message
            .filter(|message| !message.trim().is_empty())
            .or(payload.error)
        {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", truncate_chars(trimmed, ERROR_BODY_PREVIEW_CHARS), status.as_u16())
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}
