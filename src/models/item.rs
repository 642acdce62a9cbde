use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// Catalog identifier of an item
///
/// Surrounding whitespace is stripped on every construction path, serde included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.trim().len() == id.len() {
            Self(id)
        } else {
            Self(id.trim().to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// A catalog item as seen by the recommendation engine
///
/// `tags` and `cast` behave as sets: duplicates are removed on construction and
/// their order carries no meaning for scoring. Display fields ride along untouched.
/// Deserialization goes through `from_document`, so request bodies, stored
/// profiles and catalog responses are all normalized the same way.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Value")]
pub struct Item {
    pub id: ItemId,
    pub tags: Vec<String>,
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Item {
    /// Creates an item, collapsing repeated tags and cast members
    pub fn new<T, C>(id: impl Into<ItemId>, tags: T, cast: C) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            id: id.into(),
            tags: distinct_terms(tags.into_iter().map(Into::into)),
            cast: distinct_terms(cast.into_iter().map(Into::into)),
            title: None,
            image: None,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_cast(&self, member: &str) -> bool {
        self.cast.iter().any(|c| c == member)
    }

    /// Normalizes a loosely-typed catalog document into an `Item`
    ///
    /// The id may be stored under `id` or `_id`, as a string or a number.
    /// Missing or malformed `tags`/`cast` fields become empty lists and
    /// non-string entries inside them are skipped.
    pub fn from_document(doc: &Value) -> AppResult<Self> {
        let object = doc
            .as_object()
            .ok_or_else(|| AppError::Validation("item document is not an object".to_string()))?;

        let id = object
            .get("id")
            .or_else(|| object.get("_id"))
            .and_then(id_from_value)
            .ok_or_else(|| AppError::Validation("item document has no usable id".to_string()))?;

        let mut item = Item::new(
            id,
            string_list(object.get("tags")),
            string_list(object.get("cast")),
        );
        item.title = object
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);
        item.image = object
            .get("image")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(item)
    }
}

impl TryFrom<Value> for Item {
    type Error = AppError;

    fn try_from(doc: Value) -> AppResult<Self> {
        Item::from_document(&doc)
    }
}

fn id_from_value(value: &Value) -> Option<ItemId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ItemId::new(s.as_str())),
        Value::Number(n) => Some(ItemId::new(n.to_string())),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Trims terms, drops blanks and keeps the first occurrence of each
pub(crate) fn distinct_terms(terms: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for term in terms {
        let term = term.trim();
        if term.is_empty() || out.iter().any(|t| t == term) {
            continue;
        }
        out.push(term.to_string());
    }
    out
}
