//! Per-trait value distributions
//!
//! For every trait in the collection's universe, counts how many items carry
//! each value (the sentinel included) and divides by the item count.

use crate::traits::{trait_universe, validate_items, TraitMap};
use crate::Result;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Trait-name -> value -> proportion, the persisted form of a distribution
pub type ProportionTable = BTreeMap<String, BTreeMap<String, f64>>;

/// Occurrence statistics for a single trait value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueStats {
    pub count: usize,
    /// `count / item_count`, always in (0, 1]
    pub proportion: f64,
}

/// Value statistics for one trait
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitDistribution {
    values: BTreeMap<String, ValueStats>,
}

impl TraitDistribution {
    #[inline]
    pub fn get(&self, value: &str) -> Option<&ValueStats> {
        self.values.get(value)
    }

    #[inline]
    pub fn proportion(&self, value: &str) -> Option<f64> {
        self.values.get(value).map(|s| s.proportion)
    }

    /// Values in sorted order with their statistics
    pub fn values(&self) -> impl Iterator<Item = (&str, &ValueStats)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn proportion_sum(&self) -> f64 {
        self.values.values().map(|s| s.proportion).sum()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Distributions for every trait of a collection snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distributions {
    item_count: usize,
    sentinel: String,
    traits: BTreeMap<String, TraitDistribution>,
}

impl Distributions {
    /// Number of items the distributions were built from
    #[inline]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Value imputed for missing traits
    #[inline]
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    #[inline]
    pub fn get(&self, trait_name: &str) -> Option<&TraitDistribution> {
        self.traits.get(trait_name)
    }

    pub fn proportion(&self, trait_name: &str, value: &str) -> Option<f64> {
        self.traits.get(trait_name).and_then(|t| t.proportion(value))
    }

    /// Trait distributions in sorted trait order
    pub fn traits(&self) -> impl Iterator<Item = (&str, &TraitDistribution)> {
        self.traits.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sorted trait universe
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }

    /// Flatten to the trait -> value -> proportion table
    pub fn to_table(&self) -> ProportionTable {
        self.traits
            .iter()
            .map(|(name, dist)| {
                let values = dist
                    .values
                    .iter()
                    .map(|(value, stats)| (value.clone(), stats.proportion))
                    .collect();
                (name.clone(), values)
            })
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}

/// Build value distributions for every trait present on any item
///
/// Items lacking a trait are counted under `sentinel` for that trait.
/// An empty slice yields an empty table.
pub fn build_distributions(items: &[TraitMap], sentinel: &str) -> Result<Distributions> {
    validate_items(items, sentinel)?;

    let universe = trait_universe(items);
    let total = items.len() as f64;
    let mut traits = BTreeMap::new();

    for name in universe {
        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for item in items {
            let value = item.get(name).unwrap_or(sentinel);
            *counts.entry(value).or_insert(0) += 1;
        }

        let values = counts
            .into_iter()
            .map(|(value, count)| {
                let stats = ValueStats {
                    count,
                    proportion: count as f64 / total,
                };
                (value.to_string(), stats)
            })
            .collect();

        traits.insert(name.to_string(), TraitDistribution { values });
    }

    debug!(items = items.len(), traits = traits.len(), "built trait distributions");

    Ok(Distributions {
        item_count: items.len(),
        sentinel: sentinel.to_string(),
        traits,
    })
}
