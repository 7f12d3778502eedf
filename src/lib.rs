//! # rarityx
//!
//! Statistical rarity scoring and ranking for item collections.
//!
//! Each item carries a map of traits (`color: red`, `hat: cap`, ...). rarityx
//! measures how surprising each item's combination of trait values is
//! relative to the rest of its collection, and ranks the collection from
//! rarest to most common.
//!
//! ## How scores are computed
//!
//! - Every trait that appears on any item forms the trait universe. Items
//!   lacking a trait are counted under a sentinel value (`"__undefined"`).
//! - Each (trait, value) pair gets a proportion `p` = count / items.
//! - An item's information content is the sum of `-log2(p)` over its values.
//! - Its score is that sum divided by the collection-wide entropy
//!   `-sum p*log2(p)` over all (trait, value) pairs.
//! - Ranks are competition ranks: equal scores share the rarer rank.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! rarityx rank --input items.json
//! rarityx distribution --input items.json
//! rarityx snapshot --input items.json --collection apes --snapshot-dir ./data/snapshots
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use rarityx::prelude::*;
//! use serde_json::json;
//!
//! let engine = RarityEngine::default();
//! let items = engine.parse_items(&json!([
//!     {"color": "red"},
//!     {"color": "red"},
//!     {"color": "blue"}
//! ])).unwrap();
//!
//! let report = engine.rank(&items).unwrap();
//! assert_eq!(report.ranked[0].token_id, 2);
//! assert_eq!(report.ranked[0].rank, 1);
//! ```
//!
//! ## Crate Structure
//!
//! - [`rarityx-core`](https://docs.rs/rarityx-core) - Distributions, entropy, scoring, ranking, explanations
//! - [`rarityx-storage`](https://docs.rs/rarityx-storage) - Rarity snapshot persistence with retention policies

// Re-export core types
pub use rarityx_core::{
    build_distributions, score_and_rank, explain, refresh_collection,
    TraitMap, Distributions, TraitDistribution, ValueStats, ProportionTable,
    RankedItem, ItemExplanation, TraitContribution,
    RarityEngine, EngineConfig, RarityReport, DEFAULT_SENTINEL,
    TraitSource, RankSink, SnapshotSink, ItemRank, RefreshSummary,
    Error, Result,
};

// Re-export storage
pub use rarityx_storage::{SnapshotStore, RetentionPolicy, RaritySnapshot, SnapshotDescription};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        build_distributions, score_and_rank,
        TraitMap, Distributions, RankedItem,
        RarityEngine, EngineConfig, RarityReport,
        Error, Result,
        SnapshotStore, RetentionPolicy,
    };
}

/// Information-content math
pub mod entropy {
    pub use rarityx_core::entropy::{entropy_term, information_content, total_entropy};
}
