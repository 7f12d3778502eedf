//! Explainability for rarity scores
//!
//! Breaks an item's score into per-trait contributions so callers can show
//! which traits make an item rare.

use crate::distribution::Distributions;
use crate::entropy::{information_content, total_entropy};
use crate::traits::TraitMap;
use crate::{Error, Result};
use serde::Serialize;

/// Contribution of one trait to an item's information content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitContribution {
    pub trait_name: String,
    /// The item's value, or the sentinel when the item lacks the trait
    pub value: String,
    pub imputed: bool,
    pub count: usize,
    pub proportion: f64,
    /// `-log2(proportion)`
    pub information_content: f64,
}

/// Per-trait breakdown of an item's rarity score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemExplanation {
    pub token_id: usize,
    pub score: f64,
    /// Sum of the contributions' information content
    pub information_content: f64,
    pub total_entropy: f64,
    pub traits: Vec<TraitContribution>,
}

impl ItemExplanation {
    /// Contributions sorted from rarest trait to most common
    pub fn rarest_first(&self) -> Vec<&TraitContribution> {
        let mut sorted: Vec<_> = self.traits.iter().collect();
        sorted.sort_by(|a, b| {
            b.information_content
                .total_cmp(&a.information_content)
                .then_with(|| a.trait_name.cmp(&b.trait_name))
        });
        sorted
    }
}

/// Explain the score of `items[token_id]`
pub fn explain(items: &[TraitMap], distributions: &Distributions, token_id: usize) -> Result<ItemExplanation> {
    let item = items.get(token_id).ok_or(Error::UnknownItem(token_id))?;

    if let Some(unknown) = item.names().find(|name| distributions.get(name).is_none()) {
        return Err(Error::MissingDistribution {
            token_id,
            trait_name: unknown.to_string(),
        });
    }

    let mut traits = Vec::with_capacity(distributions.len());
    let mut information = 0.0;

    for (name, trait_dist) in distributions.traits() {
        let (value, imputed) = match item.get(name) {
            Some(value) => (value, false),
            None => (distributions.sentinel(), true),
        };
        let stats = trait_dist.get(value).ok_or_else(|| Error::MissingDistribution {
            token_id,
            trait_name: name.to_string(),
        })?;

        let bits = information_content(stats.proportion)?;
        information += bits;
        traits.push(TraitContribution {
            trait_name: name.to_string(),
            value: value.to_string(),
            imputed,
            count: stats.count,
            proportion: stats.proportion,
            information_content: bits,
        });
    }

    let entropy = total_entropy(distributions)?;
    let score = if entropy == 0.0 { 0.0 } else { information / entropy };

    Ok(ItemExplanation {
        token_id,
        score,
        information_content: information,
        total_entropy: entropy,
        traits,
    })
}
