//! Newsletter signup forwarding.
//!
//! `SignupForwarder::submit` validates a form, posts it to the content API's
//! `newsletter-subs` collection and always answers with a `SignupOutcome`.
//! Upstream failures are logged here and reduced to the stable
//! `SignupError` codes; callers never see upstream details.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::client::authorize;
use crate::config::Config;
use crate::error::SignupError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{CreatedEnvelope, SignupForm, SignupRequest, UpstreamError};

/// Collection the signups are written to.
pub const SUBSCRIPTIONS_PATH: &str = "/newsletter-subs";

pub const DEFAULT_SOURCE: &str = "homepage";

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

impl SignupRequest {
    /// Normalize a raw form. The email is trimmed and lower-cased before it
    /// is validated; a blank source falls back to `homepage` and a missing
    /// consent counts as given.
    pub fn from_form(form: SignupForm) -> Result<Self, SignupError> {
        let email = form
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| EMAIL.is_match(e))
            .ok_or(SignupError::EmailInvalid)?;

        let source = form
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        Ok(Self {
            email,
            source,
            consent: form.consent.unwrap_or(true),
        })
    }
}

/// Result of a signup attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    /// The entry was created; `id` is whatever the upstream assigned.
    Subscribed { id: Option<Value> },
    Rejected(SignupError),
}

impl SignupOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, SignupOutcome::Subscribed { .. })
    }

    pub fn error(&self) -> Option<SignupError> {
        match self {
            SignupOutcome::Subscribed { .. } => None,
            SignupOutcome::Rejected(error) => Some(*error),
        }
    }

    /// HTTP status a form endpoint should answer with.
    pub fn status(&self) -> u16 {
        match self {
            SignupOutcome::Subscribed { .. } => 200,
            SignupOutcome::Rejected(error) => error.status(),
        }
    }

    /// Response body: `{"ok": true, "id": ...}` or
    /// `{"ok": false, "error": "EMAIL_INVALID"}`.
    pub fn to_json(&self) -> Value {
        match self {
            SignupOutcome::Subscribed { id } => json!({
                "ok": true,
                "id": id.clone().unwrap_or(Value::Null),
            }),
            SignupOutcome::Rejected(error) => json!({
                "ok": false,
                "error": error.code(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignupForwarder<T> {
    config: Config,
    transport: T,
}

#[cfg(feature = "ureq")]
impl SignupForwarder<crate::transport::UreqTransport> {
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, crate::transport::UreqTransport::new())
    }
}

impl<T> SignupForwarder<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    /// `POST {api_base}/newsletter-subs` with `{data: {email, source, consent}}`.
    pub fn build_submit(&self, request: &SignupRequest) -> HttpRequest {
        let body = json!({ "data": request }).to_string();
        let mut http = authorize(
            HttpRequest::new(HttpMethod::Post, self.config.endpoint(SUBSCRIPTIONS_PATH))
                .with_header("content-type", "application/json")
                .with_header("accept", "application/json"),
            &self.config,
        );
        http.body = Some(body);
        http
    }

    pub fn parse_submit(&self, response: HttpResponse) -> SignupOutcome {
        if response.is_success() {
            let id = serde_json::from_str::<CreatedEnvelope>(&response.body)
                .ok()
                .and_then(|envelope| envelope.data)
                .and_then(|entry| entry.id)
                .filter(|id| !id.is_null());
            return SignupOutcome::Subscribed { id };
        }

        let upstream = UpstreamError::from_body(&response.body).unwrap_or_default();
        if is_duplicate(&upstream) {
            tracing::info!(status = response.status, "newsletter signup for an existing address");
            return SignupOutcome::Rejected(SignupError::EmailAlreadyExists);
        }

        tracing::error!(
            status = response.status,
            name = upstream.name.as_deref().unwrap_or("STRAPI_ERROR"),
            message = upstream.message.as_deref().unwrap_or("Unknown error"),
            "newsletter API error"
        );
        SignupOutcome::Rejected(SignupError::ServerError)
    }
}

impl<T: Transport> SignupForwarder<T> {
    /// Validate and forward one signup. Never fails: every problem becomes a
    /// `Rejected` outcome.
    pub fn submit(&self, form: SignupForm) -> SignupOutcome {
        let request = match SignupRequest::from_form(form) {
            Ok(request) => request,
            Err(error) => return SignupOutcome::Rejected(error),
        };

        let http = self.build_submit(&request);
        tracing::debug!(
            method = http.method.as_str(),
            url = %http.url,
            source = %request.source,
            "forwarding newsletter signup"
        );

        match self.transport.execute(&http) {
            Ok(response) => self.parse_submit(response),
            Err(e) => {
                tracing::error!(url = %http.url, error = %e, "newsletter API unreachable");
                SignupOutcome::Rejected(SignupError::ServerError)
            }
        }
    }
}

/// Best-effort detection of a uniqueness violation: the upstream reports it
/// as a generic validation error whose message mentions "unique".
fn is_duplicate(upstream: &UpstreamError) -> bool {
    let mentions_unique = |message: &str| message.to_lowercase().contains("unique");
    upstream.message.as_deref().is_some_and(mentions_unique)
        || upstream.detail_messages().into_iter().any(mentions_unique)
}
