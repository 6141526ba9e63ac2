//! # Typed request and announcement payloads.
//!
//! - [`StartRequest`]: `{ "id": "...", ...backend parameters }`
//! - [`StopRequest`]: `{ "id": "..." }`
//! - [`Termination`]: `{ "id": "..." }`, the outbound termination announcement
//!
//! Backend parameters are every top-level field other than `id`; they are kept
//! as raw JSON and decoded on demand by the backend via [`StartRequest::param`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request to start (or replace) the process for an identifier.
///
/// # Example
/// ```
/// use shellvisor::StartRequest;
///
/// let req = StartRequest::new("term-1").with_param("command", "echo hi");
/// let command: Option<String> = req.param("command").unwrap();
/// assert_eq!(command.as_deref(), Some("echo hi"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    /// Identifier scoping the process.
    pub id: String,
    /// Backend-specific parameters.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl StartRequest {
    /// Creates a request without parameters.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: Map::new(),
        }
    }

    /// Adds (or overwrites) a backend parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Decodes a backend parameter.
    ///
    /// Returns `Ok(None)` when the key is absent and `Err` when present but of
    /// the wrong shape.
    pub fn param<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.params
            .get(key)
            .map(|v| T::deserialize(v))
            .transpose()
    }

    /// Encodes the request as a JSON payload.
    pub fn to_payload(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Request to stop the process for an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopRequest {
    /// Identifier scoping the process.
    pub id: String,
}

impl StopRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Encodes the request as a JSON payload.
    pub fn to_payload(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// Announcement that the process for `id` is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Termination {
    /// Identifier whose process terminated.
    pub id: String,
}

impl Termination {
    /// Encodes the announcement as a JSON payload.
    pub fn to_payload(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_flattened() {
        let req = StartRequest::new("a")
            .with_param("command", "top")
            .with_param("cwd", "/tmp");
        let json: Value = serde_json::from_slice(&req.to_payload()).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["command"], "top");
        assert_eq!(json["cwd"], "/tmp");
    }

    #[test]
    fn test_param_shape_mismatch_is_an_error() {
        let req = StartRequest::new("a").with_param("argv", 5);
        assert!(req.param::<Vec<String>>("argv").is_err());
        assert!(req.param::<String>("missing").unwrap().is_none());
    }

    #[test]
    fn test_termination_payload() {
        let ann = Termination { id: "a".into() };
        assert_eq!(ann.to_payload(), br#"{"id":"a"}"#.to_vec());
    }
}
