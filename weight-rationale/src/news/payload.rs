//! Raw news payload shapes.
//!
//! Vendors hand back a single article object, a bare list, a list wrapped in
//! a container object, or free text. [`NewsPayload`] names each shape so the
//! parser can dispatch on it.

use serde_json::{Map, Value};

/// Keys under which vendors wrap their article lists, checked in order.
pub const CONTAINER_KEYS: &[&str] = &["feed", "items", "data", "articles", "news", "results"];

#[derive(Debug, Clone, PartialEq)]
pub enum NewsPayload {
    Empty,
    /// One article-like object
    Article(Map<String, Value>),
    /// A bare list; each entry is itself any shape
    List(Vec<Value>),
    /// A list found under a known container key
    Wrapped { key: String, items: Vec<Value> },
    /// Unstructured text, blank-line delimited
    Text(String),
}

impl NewsPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) => Self::Empty,
            Value::String(text) => Self::from_text(&text),
            Value::Array(items) => Self::List(items),
            Value::Object(mut map) => {
                let key = CONTAINER_KEYS
                    .iter()
                    .find(|k| map.get(**k).is_some_and(Value::is_array));
                match key.and_then(|k| map.remove(*k).map(|v| (k, v))) {
                    Some((key, Value::Array(items))) => Self::Wrapped {
                        key: (*key).to_string(),
                        items,
                    },
                    _ => Self::Article(map),
                }
            }
        }
    }

    /// Text that looks like JSON is decoded first; anything else stays text.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return Self::from_value(value);
            }
        }
        Self::Text(trimmed.to_string())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Article(map) => map.is_empty(),
            Self::List(items) | Self::Wrapped { items, .. } => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

impl From<Value> for NewsPayload {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}
