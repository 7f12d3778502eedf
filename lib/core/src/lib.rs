//! # rarityx Core
//!
//! Core library for rarityx, a trait rarity engine for item collections.
//!
//! Given the trait metadata of every item in a collection, this crate
//! computes:
//!
//! - [`Distributions`] - per-trait value proportions, with missing traits
//!   counted under a sentinel value
//! - [`RankedItem`] - an information-content rarity score and a rank per item
//! - [`ItemExplanation`] - a per-trait breakdown of one item's score
//!
//! Everything is recomputed from the input on each call; the engine keeps no
//! state between calls.
//!
//! ## Example
//!
//! ```rust
//! use rarityx_core::{RarityEngine, TraitMap};
//!
//! let items: Vec<TraitMap> = vec![
//!     [("color", "red")].into_iter().collect(),
//!     [("color", "red")].into_iter().collect(),
//!     [("color", "blue")].into_iter().collect(),
//! ];
//!
//! let engine = RarityEngine::default();
//! let report = engine.rank(&items).unwrap();
//!
//! // the blue item is rarest, the two red items share rank 2
//! assert_eq!(report.ranks_by_token(), vec![2, 2, 1]);
//! ```

pub mod error;
pub mod traits;
pub mod distribution;
pub mod entropy;
pub mod rank;
pub mod explain;
pub mod engine;
pub mod collaborator;

pub use error::{Error, Result};
pub use traits::{parse_item, parse_items, trait_universe, validate_items, TraitMap};
pub use distribution::{build_distributions, Distributions, ProportionTable, TraitDistribution, ValueStats};
pub use entropy::{entropy_term, information_content, item_information_content, total_entropy};
pub use rank::{rank_scores, score_and_rank, score_items, RankedItem};
pub use explain::{explain, ItemExplanation, TraitContribution};
pub use engine::{EngineConfig, RarityEngine, RarityReport, DEFAULT_SENTINEL};
pub use collaborator::{refresh_collection, ItemRank, RankSink, RefreshSummary, SnapshotSink, TraitSource};
