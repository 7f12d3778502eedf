//! Seams to the item storage layer
//!
//! The engine owns no persistence. A refresh loads every item of a
//! collection through a [`TraitSource`], ranks them, and hands the results
//! to a [`RankSink`] and a [`SnapshotSink`].

use crate::distribution::Distributions;
use crate::engine::RarityEngine;
use crate::traits::TraitMap;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supplies the trait maps of every item in a collection
pub trait TraitSource {
    /// `(item id, trait map)` pairs in a stable order
    fn load_trait_maps(&self, collection: &str) -> Result<Vec<(String, TraitMap)>>;
}

/// Writes computed ranks back onto stored items
pub trait RankSink {
    fn write_ranks(&mut self, collection: &str, ranks: &[ItemRank]) -> Result<()>;
}

/// Persists a collection's distribution table
pub trait SnapshotSink {
    fn store_snapshot(&self, collection: &str, distributions: &Distributions) -> Result<()>;
}

/// A rank mapped back to the caller's item identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRank {
    pub item_id: String,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub collection: String,
    pub item_count: usize,
    pub trait_count: usize,
    pub total_entropy: f64,
}

/// Recompute rarity for one collection and write the results out
///
/// The engine runs to completion before either sink is called, so invalid
/// trait data leaves stored ranks and snapshots untouched.
pub fn refresh_collection<S, R, P>(
    engine: &RarityEngine,
    source: &S,
    ranks: &mut R,
    snapshots: &P,
    collection: &str,
) -> Result<RefreshSummary>
where
    S: TraitSource + ?Sized,
    R: RankSink + ?Sized,
    P: SnapshotSink + ?Sized,
{
    let (ids, items): (Vec<String>, Vec<TraitMap>) =
        source.load_trait_maps(collection)?.into_iter().unzip();

    let report = engine.rank(&items)?;

    let item_ranks: Vec<ItemRank> = report
        .ranked
        .iter()
        .map(|r| ItemRank {
            item_id: ids[r.token_id].clone(),
            score: r.score,
            rank: r.rank,
        })
        .collect();

    ranks.write_ranks(collection, &item_ranks)?;
    snapshots.store_snapshot(collection, &report.distributions)?;

    debug!(collection, items = items.len(), "refreshed collection rarity");

    Ok(RefreshSummary {
        collection: collection.to_string(),
        item_count: items.len(),
        trait_count: report.distributions.len(),
        total_entropy: report.total_entropy,
    })
}
