//! Rarity scoring and ranking
//!
//! An item's score is its information content divided by the collection's
//! total entropy. Items are ranked rarest first; equal scores share a rank
//! and the next distinct score resumes at its 1-indexed position
//! (`1, 2, 2, 4`).

use crate::distribution::Distributions;
use crate::entropy::{item_information_content, total_entropy};
use crate::traits::TraitMap;
use crate::Result;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Score and rank of one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Zero-based position of the item in the input sequence
    pub token_id: usize,
    pub score: f64,
    /// 1 is the rarest
    pub rank: usize,
}

/// Rarity score for every item, in input order
///
/// When the total entropy is zero every score is zero.
pub fn score_items(items: &[TraitMap], distributions: &Distributions) -> Result<Vec<f64>> {
    let entropy = total_entropy(distributions)?;
    score_items_with_entropy(items, distributions, entropy)
}

pub(crate) fn score_items_with_entropy(
    items: &[TraitMap],
    distributions: &Distributions,
    entropy: f64,
) -> Result<Vec<f64>> {
    let mut scores = Vec::with_capacity(items.len());
    for (token_id, item) in items.iter().enumerate() {
        let information = item_information_content(token_id, item, distributions)?;
        let score = if entropy == 0.0 { 0.0 } else { information / entropy };
        scores.push(score);
    }
    Ok(scores)
}

/// Rank scores, highest first
///
/// Sorting uses `(score desc, token_id asc)` so the output order never
/// depends on sort stability. Ties require exact `f64` equality.
pub fn rank_scores(scores: &[f64]) -> Vec<RankedItem> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&token_id| (Reverse(OrderedFloat(scores[token_id])), token_id));

    let mut ranked: Vec<RankedItem> = Vec::with_capacity(order.len());
    for (position, token_id) in order.into_iter().enumerate() {
        let score = scores[token_id];
        let rank = match ranked.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => position + 1,
        };
        ranked.push(RankedItem { token_id, score, rank });
    }
    ranked
}

/// Score every item against `distributions` and rank the result
pub fn score_and_rank(items: &[TraitMap], distributions: &Distributions) -> Result<Vec<RankedItem>> {
    let scores = score_items(items, distributions)?;
    Ok(rank_scores(&scores))
}
