//! Process-wide client configuration.
//!
//! A `Config` is built once at startup and handed by value to every
//! component. It can come from code (`Config::new`), from the environment
//! (`Config::from_env`), or from an optional TOML file with the environment
//! layered on top (`Config::load`).
//!
//! ```toml
//! api_base = "https://cms.example.com/api"
//! # assets_base defaults to api_base minus its trailing /api
//! assets_base = "https://cdn.example.com"
//! api_token = "..."
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

pub const API_BASE_VAR: &str = "CMS_API_BASE";
pub const ASSETS_BASE_VAR: &str = "CMS_ASSETS_BASE";
pub const API_TOKEN_VAR: &str = "CMS_API_TOKEN";

/// RFC 3986 scheme followed by `:`. Matched as text so malformed absolute
/// URLs are never mistaken for relative paths.
static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("valid scheme pattern"));

/// Base addresses and credentials of the content API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    api_base: String,
    assets_base: String,
    api_token: Option<String>,
}

/// On-disk shape; every key is optional so the environment can fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_base: Option<String>,
    assets_base: Option<String>,
    api_token: Option<String>,
}

impl Config {
    /// Configuration for `api_base`, with the assets base derived from it.
    pub fn new(api_base: &str) -> Self {
        let api_base = api_base.trim_end_matches('/').to_string();
        let assets_base = derive_assets_base(&api_base);
        Self {
            api_base,
            assets_base,
            api_token: None,
        }
    }

    /// Override the derived assets base.
    pub fn with_assets_base(mut self, assets_base: &str) -> Self {
        self.assets_base = assets_base.trim_end_matches('/').to_string();
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_api_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        resolve(FileConfig::default(), lookup)
    }

    /// Load `path` (if given) and let the environment override its keys.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };
        resolve(file, |key| std::env::var(key).ok())
    }

    /// Parse a TOML document; no environment overrides are applied.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            source: e,
        })?;
        resolve(file, |_| None)
    }

    /// Resolve only the assets base from `path` (if given) and the
    /// environment. Media commands need nothing else, so a missing
    /// `api_base` is fine as long as the assets base is set explicitly.
    pub fn load_assets_base(path: Option<&Path>) -> Result<String, ConfigError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };
        resolve_assets_base(file, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load_assets_base`], reading variables through `lookup`.
    pub fn assets_base_from_lookup<F>(lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        resolve_assets_base(FileConfig::default(), lookup)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn assets_base(&self) -> &str {
        &self.assets_base
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    /// `api_base + path`, or `path` itself when it is already absolute.
    pub fn endpoint(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else {
            format!("{}{}", self.api_base, path)
        }
    }

    /// Resolve a media path returned by the content API against the assets
    /// base. Empty input yields an empty string.
    pub fn media_url(&self, path: &str) -> String {
        media_url(&self.assets_base, path)
    }
}

/// Join `path` onto `assets_base` unless it is empty or already absolute.
pub(crate) fn media_url(assets_base: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if is_absolute(path) {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{assets_base}{path}")
    } else {
        format!("{assets_base}/{path}")
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn resolve<F>(file: FileConfig, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let api_base = var(API_BASE_VAR)
        .or(file.api_base)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingApiBase)?;
    let mut config = Config::new(api_base.trim());

    if let Some(assets_base) = var(ASSETS_BASE_VAR).or(file.assets_base) {
        config = config.with_assets_base(assets_base.trim());
    }
    if let Some(token) = var(API_TOKEN_VAR).or(file.api_token) {
        config = config.with_api_token(token.trim());
    }
    Ok(config)
}

fn resolve_assets_base<F>(file: FileConfig, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(assets_base) = var(ASSETS_BASE_VAR)
        .or(file.assets_base)
        .filter(|v| !v.trim().is_empty())
    {
        return Ok(assets_base.trim().trim_end_matches('/').to_string());
    }
    var(API_BASE_VAR)
        .or(file.api_base)
        .filter(|v| !v.trim().is_empty())
        .map(|api_base| derive_assets_base(api_base.trim().trim_end_matches('/')))
        .ok_or(ConfigError::MissingAssetsBase)
}

/// `http://h/api` -> `http://h`; anything else is kept as is.
fn derive_assets_base(api_base: &str) -> String {
    api_base
        .strip_suffix("/api")
        .unwrap_or(api_base)
        .to_string()
}

/// True when `path` starts with a URI scheme (or is protocol-relative) and
/// must not be prefixed with a base address.
pub(crate) fn is_absolute(path: &str) -> bool {
    path.starts_with("//") || SCHEME.is_match(path)
}
