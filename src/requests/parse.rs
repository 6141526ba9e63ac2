//! # Feed-boundary validation.
//!
//! Turns raw payloads into typed requests, or a [`RequestError`] before
//! anything reaches the reconciler.
//!
//! ## Rules
//! - Not JSON / not an object / `id` not a string → [`RequestError::Malformed`]
//! - Start payload without `id` (or with an empty one) → [`RequestError::Protocol`]
//! - Stop payload without `id` (or with an empty one) → `Ok(None)`, a no-op

use serde::Deserialize;
use serde_json::{Map, Value};

use super::request::{StartRequest, StopRequest};
use crate::error::RequestError;

#[derive(Deserialize)]
struct RawRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    params: Map<String, Value>,
}

fn decode(payload: &[u8]) -> Result<RawRequest, RequestError> {
    serde_json::from_slice(payload).map_err(|e| RequestError::Malformed {
        error: e.to_string(),
    })
}

/// Parses and validates a start payload.
///
/// # Example
/// ```
/// use shellvisor::{RequestError, parse_start};
///
/// let req = parse_start(br#"{"id":"term-1","command":"htop"}"#).unwrap();
/// assert_eq!(req.id, "term-1");
///
/// let err = parse_start(br#"{"command":"htop"}"#).unwrap_err();
/// assert!(matches!(err, RequestError::Protocol { .. }));
/// ```
pub fn parse_start(payload: &[u8]) -> Result<StartRequest, RequestError> {
    let raw = decode(payload)?;
    match raw.id {
        Some(id) if !id.is_empty() => Ok(StartRequest {
            id,
            params: raw.params,
        }),
        _ => Err(RequestError::Protocol {
            reason: "missing id",
        }),
    }
}

/// Parses a stop payload; `Ok(None)` when there is nothing to stop.
pub fn parse_stop(payload: &[u8]) -> Result<Option<StopRequest>, RequestError> {
    let raw = decode(payload)?;
    Ok(raw.id.filter(|id| !id.is_empty()).map(StopRequest::new))
}
