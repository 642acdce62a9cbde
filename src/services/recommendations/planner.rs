use std::collections::HashMap;

use crate::{models::PreferenceProfile, services::catalog::Term};

/// Weight seeded for every explicitly favorited tag
pub const FAVORITE_TAG_WEIGHT: u32 = 5;
/// Weight added per favorited item carrying a tag or cast member
pub const FAVORITE_ITEM_WEIGHT: u32 = 1;

/// Cumulative weights keyed by term, remembering first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedWeights {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl OrderedWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight` to `key`, appending the key if it is new
    pub fn add(&mut self, key: &str, weight: u32) {
        match self.index.get(key) {
            Some(&pos) => self.entries[pos].1 += weight,
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), weight));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u32> {
        self.index.get(key).map(|&pos| self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(k, w)| (k.as_str(), *w))
    }

    /// The `n` heaviest keys; equal weights keep first-insertion order
    pub fn top(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<&(String, u32)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(n).map(|(k, _)| k.clone()).collect()
    }
}

/// Per-request term weights derived from a profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermWeights {
    pub tag_weight: OrderedWeights,
    pub cast_weight: OrderedWeights,
}

impl TermWeights {
    /// Favorite tags first, then favorite items in their stored order
    pub fn from_profile(profile: &PreferenceProfile) -> Self {
        let mut weights = Self::default();

        for tag in &profile.favorite_tags {
            weights.tag_weight.add(tag, FAVORITE_TAG_WEIGHT);
        }

        for item in &profile.favorite_items {
            for tag in &item.tags {
                weights.tag_weight.add(tag, FAVORITE_ITEM_WEIGHT);
            }
            for member in &item.cast {
                weights.cast_weight.add(member, FAVORITE_ITEM_WEIGHT);
            }
        }

        weights
    }
}

/// The catalog queries to run for one request, plus the weights to score with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub tag_terms: Vec<String>,
    pub cast_terms: Vec<String>,
    pub weights: TermWeights,
}

impl QueryPlan {
    pub fn is_empty(&self) -> bool {
        self.tag_terms.is_empty() && self.cast_terms.is_empty()
    }

    /// Terms in canonical order: tag terms, then cast terms
    pub fn terms(&self) -> Vec<Term> {
        self.tag_terms
            .iter()
            .cloned()
            .map(Term::Tag)
            .chain(self.cast_terms.iter().cloned().map(Term::Cast))
            .collect()
    }
}

/// Picks the highest-signal tag and cast terms for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPlanner {
    max_tag_terms: usize,
    max_cast_terms: usize,
}

impl QueryPlanner {
    pub fn new(max_tag_terms: usize, max_cast_terms: usize) -> Self {
        Self {
            max_tag_terms,
            max_cast_terms,
        }
    }

    pub fn plan(&self, profile: &PreferenceProfile) -> QueryPlan {
        if profile.is_empty() {
            return QueryPlan::default();
        }

        let weights = TermWeights::from_profile(profile);
        QueryPlan {
            tag_terms: weights.tag_weight.top(self.max_tag_terms),
            cast_terms: weights.cast_weight.top(self.max_cast_terms),
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    fn profile(tags: &[&str], items: Vec<Item>) -> PreferenceProfile {
        let mut profile = PreferenceProfile::new();
        for tag in tags {
            profile.add_tag(tag);
        }
        for item in items {
            profile.add_item(item);
        }
        profile
    }

    #[test]
    fn test_weights_for_reference_profile() {
        let profile = profile(&["healing"], vec![Item::new("P1", ["daily"], ["A"])]);
        let weights = TermWeights::from_profile(&profile);

        assert_eq!(weights.tag_weight.get("healing"), Some(5));
        assert_eq!(weights.tag_weight.get("daily"), Some(1));
        assert_eq!(weights.cast_weight.get("A"), Some(1));
        assert_eq!(weights.tag_weight.len(), 2);
    }

    #[test]
    fn test_item_weights_accumulate_on_top_of_explicit() {
        let profile = profile(
            &["healing"],
            vec![
                Item::new("P1", ["healing", "daily"], ["A"]),
                Item::new("P2", ["daily"], ["A", "B"]),
            ],
        );
        let weights = TermWeights::from_profile(&profile);

        assert_eq!(weights.tag_weight.get("healing"), Some(6));
        assert_eq!(weights.tag_weight.get("daily"), Some(2));
        assert_eq!(weights.cast_weight.get("A"), Some(2));
        assert_eq!(weights.cast_weight.get("B"), Some(1));
    }

    #[test]
    fn test_plan_selects_reference_terms() {
        let profile = profile(&["healing"], vec![Item::new("P1", ["daily"], ["A"])]);
        let plan = QueryPlanner::new(3, 2).plan(&profile);

        assert_eq!(plan.tag_terms, vec!["healing", "daily"]);
        assert_eq!(plan.cast_terms, vec!["A"]);
        assert_eq!(
            plan.terms(),
            vec![
                Term::Tag("healing".into()),
                Term::Tag("daily".into()),
                Term::Cast("A".into())
            ]
        );
    }

    #[test]
    fn test_plan_caps_terms_and_breaks_ties_by_insertion() {
        let profile = profile(
            &[],
            vec![
                Item::new("P1", ["a", "b", "c", "d"], ["X", "Y", "Z"]),
                Item::new("P2", ["d"], ["Z"]),
            ],
        );
        let plan = QueryPlanner::new(3, 2).plan(&profile);

        // d has weight 2, the rest tie at 1 and keep their first-seen order
        assert_eq!(plan.tag_terms, vec!["d", "a", "b"]);
        assert_eq!(plan.cast_terms, vec!["Z", "X"]);
    }

    #[test]
    fn test_empty_profile_plans_nothing() {
        let plan = QueryPlanner::new(3, 2).plan(&PreferenceProfile::new());
        assert!(plan.is_empty());
        assert!(plan.terms().is_empty());
        assert!(plan.weights.tag_weight.is_empty());
    }

    #[test]
    fn test_items_without_tags_or_cast_plan_nothing() {
        let profile = profile(&[], vec![Item::new("P1", Vec::<String>::new(), Vec::<String>::new())]);
        let plan = QueryPlanner::new(3, 2).plan(&profile);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_ordered_weights_top_is_stable() {
        let mut weights = OrderedWeights::new();
        weights.add("x", 1);
        weights.add("y", 3);
        weights.add("z", 1);
        weights.add("x", 2);

        assert_eq!(weights.top(10), vec!["x", "y", "z"]);
        assert_eq!(weights.top(0), Vec::<String>::new());
        let collected: Vec<(&str, u32)> = weights.iter().collect();
        assert_eq!(collected, vec![("x", 3), ("y", 3), ("z", 1)]);
    }
}
