use std::collections::HashSet;

use crate::models::{Item, ScoredItem};

use super::aggregator::CandidateSet;
use super::planner::TermWeights;

/// Flat bonus for a tag the user favorited explicitly
pub const EXPLICIT_TAG_BONUS: u64 = 10;
/// Multiplier applied to a matched tag's weight
pub const TAG_WEIGHT_FACTOR: u64 = 2;
/// Multiplier applied to a matched cast member's weight
pub const CAST_WEIGHT_FACTOR: u64 = 3;

/// Weighted term-overlap scoring
///
/// Weights are additive and unbounded; no normalization or decay.
pub struct Scorer<'a> {
    weights: &'a TermWeights,
    favorite_tags: HashSet<&'a str>,
}

impl<'a> Scorer<'a> {
    pub fn new(weights: &'a TermWeights, favorite_tags: &'a [String]) -> Self {
        Self {
            weights,
            favorite_tags: favorite_tags.iter().map(String::as_str).collect(),
        }
    }

    pub fn score(&self, item: &Item) -> u64 {
        let tag_score: u64 = item
            .tags
            .iter()
            .filter_map(|tag| {
                let weight = u64::from(self.weights.tag_weight.get(tag)?);
                let bonus = if self.favorite_tags.contains(tag.as_str()) {
                    EXPLICIT_TAG_BONUS
                } else {
                    0
                };
                Some(bonus + weight * TAG_WEIGHT_FACTOR)
            })
            .sum();

        let cast_score: u64 = item
            .cast
            .iter()
            .filter_map(|member| self.weights.cast_weight.get(member))
            .map(|weight| u64::from(weight) * CAST_WEIGHT_FACTOR)
            .sum();

        tag_score + cast_score
    }

    /// Scores every candidate, keeping canonical order
    pub fn score_all(&self, candidates: CandidateSet) -> Vec<ScoredItem> {
        candidates
            .into_items()
            .into_iter()
            .map(|item| {
                let score = self.score(&item);
                ScoredItem::new(item, score)
            })
            .collect()
    }
}
