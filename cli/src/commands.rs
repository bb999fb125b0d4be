use std::path::Path;

use anyhow::{bail, Context, Result};
use cms_core::{
    Config, ContentClient, GalleryOptions, MediaResolver, ParamMap, ParamValue, SignupForm,
    SignupForwarder, SignupOutcome,
};
use serde_json::Value;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load(path).context("failed to load configuration")?;
    tracing::debug!(
        api_base = config.api_base(),
        assets_base = config.assets_base(),
        token = config.api_token().is_some(),
        "configuration loaded"
    );
    Ok(config)
}

/// Media commands only resolve URLs, so they need just the assets base.
pub fn load_assets_base(path: Option<&Path>) -> Result<String> {
    let assets_base =
        Config::load_assets_base(path).context("failed to load configuration")?;
    tracing::debug!(assets_base = assets_base.as_str(), "assets base loaded");
    Ok(assets_base)
}

fn parse_json(raw: &str, what: &str) -> Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("{what} is not valid JSON"))
}

/// `--params` must be a JSON object; absent means no parameters.
pub fn parse_params(raw: Option<&str>) -> Result<ParamMap> {
    let Some(raw) = raw else {
        return Ok(ParamMap::new());
    };
    match ParamValue::from(parse_json(raw, "--params")?) {
        ParamValue::Map(map) => Ok(map),
        _ => bail!("--params must be a JSON object"),
    }
}

pub fn get(config: Config, path: &str, params: Option<&str>) -> Result<Value> {
    let params = parse_params(params)?;
    let client = ContentClient::new(config);
    client
        .get(path, &params)
        .with_context(|| format!("GET {path} failed"))
}

pub fn media(assets_base: &str, field: &str, all: bool) -> Result<Value> {
    let field = parse_json(field, "media field")?;
    let resolver = MediaResolver::with_assets_base(assets_base);
    let output = if all {
        serde_json::to_value(resolver.urls_from(&field))?
    } else {
        serde_json::to_value(resolver.image_binding(&field))?
    };
    Ok(output)
}

pub fn gallery(assets_base: &str, entry: &str, options: &GalleryOptions) -> Result<Value> {
    let entry = parse_json(entry, "entry")?;
    let urls = MediaResolver::with_assets_base(assets_base).gallery_from(&entry, options);
    Ok(serde_json::to_value(urls)?)
}

pub fn subscribe(config: Config, email: &str, source: Option<String>, consent: bool) -> SignupOutcome {
    let form = SignupForm {
        email: Some(email.to_string()),
        source,
        consent: Some(consent),
    };
    SignupForwarder::new(config).submit(form)
}
