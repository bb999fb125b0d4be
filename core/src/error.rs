//! Error types for the content API client.
//!
//! # Design
//! Reads and writes fail differently. A failed read (`ContentClient::get`)
//! surfaces as a `RequestError` the caller must handle. A failed signup never
//! escapes as an error: it is folded into a `SignupOutcome` carrying one of
//! the `SignupError` codes, so a form handler always has a definite answer.

use serde::Serialize;
use thiserror::Error;

/// Errors returned by `ContentClient::get` and `ContentClient::parse_get`.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The content API answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// No response was obtained at all.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Decode(String),
}

impl RequestError {
    /// Upstream status code, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of a [`Transport`](crate::Transport) to produce any response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Stable error vocabulary of the newsletter signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignupError {
    #[error("email address is missing or invalid")]
    EmailInvalid,

    #[error("email address is already subscribed")]
    EmailAlreadyExists,

    #[error("newsletter service unavailable")]
    ServerError,
}

impl SignupError {
    /// HTTP status a form endpoint should answer with.
    pub fn status(self) -> u16 {
        match self {
            SignupError::EmailInvalid => 400,
            SignupError::EmailAlreadyExists => 409,
            SignupError::ServerError => 500,
        }
    }

    /// Wire code, e.g. `EMAIL_ALREADY_EXISTS`.
    pub fn code(self) -> &'static str {
        match self {
            SignupError::EmailInvalid => "EMAIL_INVALID",
            SignupError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            SignupError::ServerError => "SERVER_ERROR",
        }
    }
}

/// Errors raised while assembling a [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("content API base URL is not configured (set CMS_API_BASE or api_base)")]
    MissingApiBase,

    #[error("media assets base URL is not configured (set CMS_ASSETS_BASE, assets_base or an API base to derive it from)")]
    MissingAssetsBase,

    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: std::path::PathBuf,
        source: toml::de::Error,
    },
}
