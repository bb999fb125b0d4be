//! Read access to the content API.
//!
//! # Design
//! `ContentClient` holds only its `Config` and a transport; it carries no
//! state between calls. Reads are split into `build_get` (produces an
//! `HttpRequest`) and `parse_get` (consumes an `HttpResponse`), and `get`
//! drives both through the transport. A failed read is returned to the
//! caller as a `RequestError`; there is no retry.

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::media::MediaResolver;
use crate::query::{encode, ParamMap};
use crate::transport::Transport;
use crate::types::UpstreamError;

#[derive(Debug, Clone)]
pub struct ContentClient<T> {
    config: Config,
    transport: T,
}

#[cfg(feature = "ureq")]
impl ContentClient<crate::transport::UreqTransport> {
    /// Client using the blocking `ureq` transport.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, crate::transport::UreqTransport::new())
    }
}

impl<T> ContentClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `GET {api_base}{path}{query}`; an absolute `path` replaces the base.
    pub fn build_get(&self, path: &str, params: &ParamMap) -> HttpRequest {
        let url = format!("{}{}", self.config.endpoint(path), encode(params));
        authorize(
            HttpRequest::new(HttpMethod::Get, url).with_header("accept", "application/json"),
            &self.config,
        )
    }

    pub fn parse_get<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, RequestError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| RequestError::Decode(e.to_string()))
    }

    /// Absolute URL of a media path returned by the content API.
    pub fn media_url(&self, path: &str) -> String {
        self.config.media_url(path)
    }

    /// Media helpers resolving against this client's assets base.
    pub fn media(&self) -> MediaResolver {
        MediaResolver::new(&self.config)
    }
}

impl<T: Transport> ContentClient<T> {
    /// Fetch `path` with `params` and decode the JSON body as `R`.
    pub fn get<R: DeserializeOwned>(&self, path: &str, params: &ParamMap) -> Result<R, RequestError> {
        let request = self.build_get(path, params);
        tracing::debug!(method = request.method.as_str(), url = %request.url, "content api request");

        let response = self.transport.execute(&request).map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "content api unreachable");
            e
        })?;
        tracing::debug!(url = %request.url, status = response.status, "content api responded");

        self.parse_get(response)
    }
}

/// Attach the bearer token, if one is configured.
pub(crate) fn authorize(request: HttpRequest, config: &Config) -> HttpRequest {
    match config.api_token() {
        Some(token) => request.with_header("authorization", &format!("Bearer {token}")),
        None => request,
    }
}

/// Map non-success status codes to `RequestError::Status`, preferring the
/// message of the upstream error envelope over the raw body.
fn check_status(response: &HttpResponse) -> Result<(), RequestError> {
    if response.is_success() {
        return Ok(());
    }
    let message = UpstreamError::from_body(&response.body)
        .and_then(|e| e.message)
        .unwrap_or_else(|| response.body.clone());
    Err(RequestError::Status {
        status: response.status,
        message,
    })
}
