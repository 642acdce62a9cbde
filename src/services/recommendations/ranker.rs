use crate::models::ScoredItem;

/// Orders scored candidates by descending score and keeps the first `limit`
///
/// The sort is stable, so equal scores keep the order they arrived in.
pub fn rank(mut scored: Vec<ScoredItem>, limit: usize) -> Vec<ScoredItem> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}
