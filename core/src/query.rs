//! Query-string encoding for content API parameters.
//!
//! The content API accepts nested filters and repeated parameters in bracket
//! notation (`filters[slug][$eq]=x`, `populate[0]=cover`). `ParamValue` is a
//! closed recursive type so the shapes that can reach the encoder are
//! explicit: scalars, lists and maps, nested to any depth.
//!
//! Keys are emitted in insertion order because `ParamMap` is an `IndexMap`.

use indexmap::IndexMap;
use url::form_urlencoded;

/// Ordered parameter map; iteration follows insertion order.
pub type ParamMap = IndexMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Skipped entirely by the encoder.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
    Map(ParamMap),
}

/// Build a `ParamMap` from `(key, value)` pairs.
pub fn param_map<K, V, I>(entries: I) -> ParamMap
where
    K: Into<String>,
    V: Into<ParamValue>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Encode `params` as `?k=v&...`, or the empty string when nothing remains
/// after dropping nulls.
pub fn encode(params: &ParamMap) -> String {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(&mut pairs, &escape(key), value);
    }
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

fn push_pairs(pairs: &mut Vec<String>, key: &str, value: &ParamValue) {
    match value {
        ParamValue::Null => {}
        ParamValue::Bool(b) => pairs.push(format!("{key}={b}")),
        ParamValue::Int(n) => pairs.push(format!("{key}={n}")),
        ParamValue::Float(n) => pairs.push(format!("{key}={}", escape(&n.to_string()))),
        ParamValue::Str(s) => pairs.push(format!("{key}={}", escape(s))),
        ParamValue::List(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(pairs, &format!("{key}[{index}]"), item);
            }
        }
        ParamValue::Map(map) => {
            for (sub, item) in map {
                push_pairs(pairs, &format!("{key}[{}]", escape(sub)), item);
            }
        }
    }
}

fn escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        match i64::try_from(v) {
            Ok(n) => ParamValue::Int(n),
            Err(_) => ParamValue::Str(v.to_string()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::Null, Into::into)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        ParamValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<ParamMap> for ParamValue {
    fn from(v: ParamMap) -> Self {
        ParamValue::Map(v)
    }
}

/// Untyped JSON (e.g. from a command line) converts structurally; numbers
/// that do not fit `i64` keep their textual form.
impl From<serde_json::Value> for ParamValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => ParamValue::Null,
            Value::Bool(b) => ParamValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Str(n.to_string()),
            },
            Value::String(s) => ParamValue::Str(s),
            Value::Array(items) => ParamValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                ParamValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
