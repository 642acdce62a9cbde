mod item;
mod user_preferences;

pub use item::{Item, ItemId};
pub use user_preferences::PreferenceProfile;

use serde::Serialize;

/// A candidate item paired with its relevance score
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScoredItem {
    pub item: Item,
    pub score: u64,
}

impl ScoredItem {
    pub fn new(item: Item, score: u64) -> Self {
        Self { item, score }
    }
}
