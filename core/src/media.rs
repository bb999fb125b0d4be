//! Media-field normalization.
//!
//! The content API encodes the same logical image attribute in one of four
//! shapes depending on how the collection is configured and populated:
//!
//! | shape            | JSON                                                    |
//! |------------------|---------------------------------------------------------|
//! | flat single      | `{"url": "...", "alternativeText": "..."}`              |
//! | flat multiple    | `[{"url": ...}, ...]`                                   |
//! | wrapped single   | `{"data": {"attributes": {"url": ...}}}`                |
//! | wrapped multiple | `{"data": [{"attributes": {"url": ...}}, ...]}`         |
//!
//! `MediaField::classify` picks exactly one of these (or `Unrecognized`) by
//! testing the shapes in the order above; everything downstream matches on
//! the variant. A value that fits no shape yields no media, never an error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{self, Config};

/// One image reference as found in the content, before URL resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub url: String,
    pub alt_text: String,
}

/// A media attribute value, classified by shape.
#[derive(Debug, Clone, Copy)]
pub enum MediaField<'a> {
    FlatSingle(&'a Map<String, Value>),
    FlatMultiple(&'a [Value]),
    /// Holds the node's `attributes` object.
    WrappedSingle(&'a Map<String, Value>),
    /// Holds the `data` nodes.
    WrappedMultiple(&'a [Value]),
    Unrecognized,
}

impl<'a> MediaField<'a> {
    pub fn classify(value: &'a Value) -> Self {
        if let Value::Array(items) = value {
            let flat = items
                .first()
                .and_then(Value::as_object)
                .is_some_and(|first| first.contains_key("url"));
            return if flat {
                MediaField::FlatMultiple(items)
            } else {
                MediaField::Unrecognized
            };
        }

        let Some(object) = value.as_object() else {
            return MediaField::Unrecognized;
        };
        if object.contains_key("url") {
            return MediaField::FlatSingle(object);
        }

        match object.get("data") {
            Some(Value::Array(nodes)) => MediaField::WrappedMultiple(nodes),
            Some(node) => match attributes_with_url(node) {
                Some(attributes) => MediaField::WrappedSingle(attributes),
                None => MediaField::Unrecognized,
            },
            None => MediaField::Unrecognized,
        }
    }

    /// Items carried by this field, in content order.
    pub fn items(self) -> Vec<MediaItem> {
        match self {
            MediaField::FlatSingle(object) => vec![item(object)],
            MediaField::FlatMultiple(elements) => elements
                .iter()
                .map(|element| element.as_object().map(item).unwrap_or_default())
                .collect(),
            MediaField::WrappedSingle(attributes) => vec![item(attributes)],
            // Nodes without a url are partial data, not errors.
            MediaField::WrappedMultiple(nodes) => nodes
                .iter()
                .filter_map(attributes_with_url)
                .map(item)
                .collect(),
            MediaField::Unrecognized => Vec::new(),
        }
    }
}

fn attributes_with_url(node: &Value) -> Option<&Map<String, Value>> {
    node.get("attributes")
        .and_then(Value::as_object)
        .filter(|attributes| attributes.get("url").is_some_and(Value::is_string))
}

fn item(object: &Map<String, Value>) -> MediaItem {
    MediaItem {
        url: string_field(object, "url"),
        alt_text: string_field(object, "alternativeText"),
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Extract the media items of `field`, whatever its shape.
pub fn normalize(field: &Value) -> Vec<MediaItem> {
    let shape = MediaField::classify(field);
    if matches!(shape, MediaField::Unrecognized) && !field.is_null() {
        tracing::trace!(%field, "media field matches no known shape");
    }
    shape.items()
}

/// Where `gallery_from` looks for the cover and the supplementary images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryOptions {
    pub cover_key: String,
    pub gallery_key: String,
    pub limit: usize,
}

impl GalleryOptions {
    pub fn new(cover_key: &str, gallery_key: &str) -> Self {
        Self {
            cover_key: cover_key.to_string(),
            gallery_key: gallery_key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            cover_key: "cover".to_string(),
            gallery_key: "images".to_string(),
            limit: 6,
        }
    }
}

/// Attributes to set on an `<img>` element for a media value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBinding {
    pub src: String,
    /// `None` leaves any existing alt text on the element untouched.
    pub alt: Option<String>,
    pub loading: &'static str,
    pub decoding: &'static str,
}

/// Resolves media fields into absolute URLs against the assets base.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    assets_base: String,
}

impl MediaResolver {
    pub fn new(config: &Config) -> Self {
        Self::with_assets_base(config.assets_base())
    }

    /// Resolver that needs no API configuration at all.
    pub fn with_assets_base(assets_base: &str) -> Self {
        Self {
            assets_base: assets_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn assets_base(&self) -> &str {
        &self.assets_base
    }

    pub fn media_url(&self, path: &str) -> String {
        config::media_url(&self.assets_base, path)
    }

    /// Absolute URLs of every item in `field`, skipping items without one.
    pub fn urls_from(&self, field: &Value) -> Vec<String> {
        normalize(field)
            .iter()
            .map(|item| self.media_url(&item.url))
            .filter(|url| !url.is_empty())
            .collect()
    }

    pub fn first_url_from(&self, field: &Value) -> String {
        self.urls_from(field).into_iter().next().unwrap_or_default()
    }

    pub fn first_alt_from(&self, field: &Value) -> String {
        normalize(field)
            .into_iter()
            .next()
            .map(|item| item.alt_text)
            .unwrap_or_default()
    }

    /// Cover image of `object` followed by its gallery images, at most
    /// `options.limit` URLs in total.
    pub fn gallery_from(&self, object: &Value, options: &GalleryOptions) -> Vec<String> {
        let cover = object
            .get(&options.cover_key)
            .map(|field| self.first_url_from(field))
            .unwrap_or_default();
        let gallery = object
            .get(&options.gallery_key)
            .map(|field| self.urls_from(field))
            .unwrap_or_default();

        let mut urls = Vec::with_capacity(options.limit);
        if !cover.is_empty() && options.limit > 0 {
            urls.push(cover);
        }
        let room = options.limit - urls.len();
        urls.extend(gallery.into_iter().take(room));
        urls
    }

    pub fn image_binding(&self, field: &Value) -> ImageBinding {
        let alt = self.first_alt_from(field);
        ImageBinding {
            src: self.first_url_from(field),
            alt: (!alt.is_empty()).then_some(alt),
            loading: "lazy",
            decoding: "async",
        }
    }
}
