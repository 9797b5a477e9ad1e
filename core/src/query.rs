//! Query-string shaping for list endpoints.
//!
//! # Design
//! Filter structs are plain `Serialize` types with `Option` fields. `shape`
//! serializes one to a JSON object and flattens it into wire pairs:
//! - `None` (JSON `null`) is omitted, never sent as an empty string.
//! - `0` and `false` are real values and are sent.
//! - Arrays explode into indexed keys, `tags[0]=1&tags[1]=2`; an empty array
//!   produces nothing.
//! - Nested objects flatten into `field[key]`.
//!
//! Pairs keep field declaration order and element order.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Flat, ordered list of query-string pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keeps only the pairs whose key satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.pairs.retain(|(k, _)| keep(k));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Signature of a filter-to-query transformer.
pub type QueryTransform<F> = fn(&F) -> Result<QueryParams, ValidationError>;

/// Pagination-only filters, the shape every list endpoint accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl PageFilters {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }
}

/// Shapes every present field of `filters` into query pairs.
pub fn shape<F: Serialize + ?Sized>(filters: &F) -> Result<QueryParams, ValidationError> {
    let value = serde_json::to_value(filters)
        .map_err(|e| ValidationError::new("filters", e.to_string()))?;

    let mut params = QueryParams::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                flatten(&key, value, &mut params);
            }
        }
        other => {
            return Err(ValidationError::new(
                "filters",
                format!("expected an object, found {}", kind_of(&other)),
            ))
        }
    }
    Ok(params)
}

/// Shapes `filters` but keeps only `page` and `per_page`.
pub fn pagination_only<F: Serialize + ?Sized>(filters: &F) -> Result<QueryParams, ValidationError> {
    let mut params = shape(filters)?;
    params.retain(|key| key == "page" || key == "per_page");
    Ok(params)
}

fn flatten(key: &str, value: Value, out: &mut QueryParams) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(key, b.to_string()),
        Value::Number(n) => out.push(key, n.to_string()),
        Value::String(s) => out.push(key, s),
        Value::Array(items) => {
            let present = items.into_iter().filter(|item| !item.is_null());
            for (index, item) in present.enumerate() {
                flatten(&format!("{key}[{index}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (child, value) in map {
                flatten(&format!("{key}[{child}]"), value, out);
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
