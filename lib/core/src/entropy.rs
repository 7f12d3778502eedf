//! Information content and entropy over trait distributions

use crate::distribution::Distributions;
use crate::traits::TraitMap;
use crate::{Error, Result};

/// `-log2(p)` for a proportion in (0, 1]
///
/// Proportions come from counts of at least one, so anything outside the
/// interval means the distribution table is corrupt.
#[inline]
pub fn information_content(p: f64) -> Result<f64> {
    if !(p > 0.0 && p <= 1.0) {
        return Err(Error::Internal(format!("proportion {} outside (0, 1]", p)));
    }
    // + 0.0 turns -log2(1) = -0.0 into 0.0
    Ok(-p.log2() + 0.0)
}

/// `-p * log2(p)`
#[inline]
pub fn entropy_term(p: f64) -> Result<f64> {
    Ok(p * information_content(p)?)
}

/// Entropy of the flattened multiset of every (trait, value) proportion
///
/// This is a collection-wide constant, not a per-trait entropy.
pub fn total_entropy(distributions: &Distributions) -> Result<f64> {
    let mut entropy = 0.0;
    for (_, trait_dist) in distributions.traits() {
        for (_, stats) in trait_dist.values() {
            entropy += entropy_term(stats.proportion)?;
        }
    }
    Ok(entropy)
}

/// Sum of `-log2(p)` over the trait universe for one item
///
/// Missing traits contribute the sentinel's proportion. A trait or value
/// absent from `distributions` is a precondition failure.
pub fn item_information_content(
    token_id: usize,
    item: &TraitMap,
    distributions: &Distributions,
) -> Result<f64> {
    if let Some(unknown) = item.names().find(|name| distributions.get(name).is_none()) {
        return Err(Error::MissingDistribution {
            token_id,
            trait_name: unknown.to_string(),
        });
    }

    let mut total = 0.0;
    for (name, trait_dist) in distributions.traits() {
        let value = item.get(name).unwrap_or(distributions.sentinel());
        let stats = trait_dist.get(value).ok_or_else(|| Error::MissingDistribution {
            token_id,
            trait_name: name.to_string(),
        })?;
        total += information_content(stats.proportion)?;
    }
    Ok(total)
}
