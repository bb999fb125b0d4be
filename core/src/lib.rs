//! Client core for a headless content API.
//!
//! # Overview
//! Builds query strings, reads JSON content, resolves media fields into
//! absolute URLs and forwards newsletter signups. Request building and
//! response parsing are pure; a `Transport` performs the round-trip in
//! between (host-does-IO pattern), so every rule here is testable without a
//! network.
//!
//! # Design
//! - `Config` is built once and passed by value into each component.
//! - `ContentClient` reads (`get`) and propagates failures as `RequestError`.
//! - `MediaResolver` classifies media values into an explicit `MediaField`
//!   sum type and never fails on unknown shapes.
//! - `SignupForwarder` writes and always returns a `SignupOutcome`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod query;
pub mod signup;
pub mod transport;
pub mod types;

pub use client::ContentClient;
pub use config::Config;
pub use error::{ConfigError, RequestError, SignupError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use media::{normalize, GalleryOptions, ImageBinding, MediaField, MediaItem, MediaResolver};
pub use query::{encode, param_map, ParamMap, ParamValue};
pub use signup::{SignupForwarder, SignupOutcome};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{SignupForm, SignupRequest, UpstreamError};
