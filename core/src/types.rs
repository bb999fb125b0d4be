//! DTOs exchanged with the content API.
//!
//! # Design
//! These mirror the upstream's JSON envelopes (`{data: ...}` on success,
//! `{error: {...}}` on failure) but are defined independently from the
//! mock-server crate; integration tests catch schema drift between the two.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw signup input as submitted by a form; every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub consent: Option<bool>,
}

impl SignupForm {
    pub fn with_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Self::default()
        }
    }
}

/// Normalized, validated signup ready to be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub source: String,
    pub consent: bool,
}

/// Success envelope of a create call. Only the id is of interest.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedEnvelope {
    #[serde(default)]
    pub data: Option<CreatedEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedEntry {
    #[serde(default)]
    pub id: Option<Value>,
}

/// Failure envelope: `{error: {status, name, message, details}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: UpstreamError,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamError {
    /// Echo of the HTTP status. Kept as raw JSON since some deployments send
    /// it as a string; the response's own status is authoritative.
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl UpstreamError {
    /// Parse the error envelope out of a response body, if it has one.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }

    /// Messages of the individual validation failures under
    /// `details.errors[]`, if any.
    pub fn detail_messages(&self) -> Vec<&str> {
        self.details
            .as_ref()
            .and_then(|d| d.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}
