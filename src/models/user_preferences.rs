use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::{Item, ItemId};

/// A user's accumulated preference signals
///
/// `favorite_tags` are explicit signals, `favorite_items` implicit ones.
/// Neither list ever holds a duplicate (tags by value, items by id).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    #[serde(default)]
    pub favorite_tags: Vec<String>,
    #[serde(default)]
    pub favorite_items: Vec<Item>,
}

impl PreferenceProfile {
    /// Creates an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.favorite_tags.is_empty() && self.favorite_items.is_empty()
    }

    /// Adds a favorite tag; returns false when it was already present or blank
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.favorite_tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.favorite_tags.len();
        self.favorite_tags.retain(|t| t != tag.trim());
        before != self.favorite_tags.len()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.favorite_tags.iter().any(|t| t == tag)
    }

    /// Adds a favorite item; an item whose id is already stored is left untouched
    pub fn add_item(&mut self, item: Item) -> bool {
        if self.has_item(&item.id) {
            return false;
        }
        self.favorite_items.push(item);
        true
    }

    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let before = self.favorite_items.len();
        self.favorite_items.retain(|i| &i.id != id);
        before != self.favorite_items.len()
    }

    pub fn has_item(&self, id: &ItemId) -> bool {
        self.favorite_items.iter().any(|i| &i.id == id)
    }

    pub fn clear(&mut self) {
        self.favorite_tags.clear();
        self.favorite_items.clear();
    }

    pub fn clear_tags(&mut self) {
        self.favorite_tags.clear();
    }

    /// Ids of every favorited item
    pub fn favorite_item_ids(&self) -> HashSet<ItemId> {
        self.favorite_items.iter().map(|i| i.id.clone()).collect()
    }

    /// Rebuilds a profile from an untrusted stored document
    ///
    /// Entries that fail validation are dropped and logged; whatever remains is
    /// returned. A document that is not an object yields an empty profile.
    pub fn from_document(doc: &Value) -> Self {
        let mut profile = Self::new();

        let Some(object) = doc.as_object() else {
            tracing::warn!("Stored preference document is not an object, using empty profile");
            return profile;
        };

        if let Some(Value::Array(tags)) = object.get("favoriteTags") {
            for tag in tags {
                match tag.as_str() {
                    Some(tag) => {
                        profile.add_tag(tag);
                    }
                    None => tracing::warn!(entry = %tag, "Dropping non-string favorite tag"),
                }
            }
        }

        if let Some(Value::Array(items)) = object.get("favoriteItems") {
            for entry in items {
                match Item::from_document(entry) {
                    Ok(item) => {
                        profile.add_item(item);
                    }
                    Err(e) => tracing::warn!(error = %e, "Dropping malformed favorite item"),
                }
            }
        }

        profile
    }
}
