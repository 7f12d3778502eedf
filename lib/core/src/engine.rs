use crate::distribution::{build_distributions, Distributions};
use crate::entropy::total_entropy;
use crate::explain::{explain, ItemExplanation};
use crate::rank::{rank_scores, score_items_with_entropy, RankedItem};
use crate::traits::{parse_items, TraitMap};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Value imputed for traits an item does not have
pub const DEFAULT_SENTINEL: &str = "__undefined";

/// Configuration for the rarity engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sentinel.trim().is_empty() {
            return Err(Error::InvalidConfig("sentinel must not be empty".to_string()));
        }
        if self.sentinel.trim() != self.sentinel {
            return Err(Error::InvalidConfig(
                "sentinel must not have surrounding whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ranking-mode output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityReport {
    /// Items ordered rarest first
    pub ranked: Vec<RankedItem>,
    pub total_entropy: f64,
    pub distributions: Distributions,
}

impl RarityReport {
    /// Ranks in input order, indexed by token id
    pub fn ranks_by_token(&self) -> Vec<usize> {
        let mut ranks = vec![0; self.ranked.len()];
        for item in &self.ranked {
            ranks[item.token_id] = item.rank;
        }
        ranks
    }
}

/// Stateless rarity engine
///
/// Holds only its configuration; every call recomputes from the items it is
/// given, so one engine can serve any number of collections concurrently.
#[derive(Debug, Clone)]
pub struct RarityEngine {
    config: EngineConfig,
}

impl RarityEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn sentinel(&self) -> &str {
        &self.config.sentinel
    }

    /// Parse and validate JSON trait data
    pub fn parse_items(&self, value: &Value) -> Result<Vec<TraitMap>> {
        parse_items(value)
    }

    /// Distribution mode: per-trait value proportions only
    pub fn distribution(&self, items: &[TraitMap]) -> Result<Distributions> {
        build_distributions(items, &self.config.sentinel)
    }

    /// Ranking mode: distributions, scores and ranks in one pass
    pub fn rank(&self, items: &[TraitMap]) -> Result<RarityReport> {
        let distributions = self.distribution(items)?;
        let entropy = total_entropy(&distributions)?;
        let scores = score_items_with_entropy(items, &distributions, entropy)?;
        let ranked = rank_scores(&scores);

        debug!(
            items = items.len(),
            traits = distributions.len(),
            total_entropy = entropy,
            "ranked collection"
        );

        Ok(RarityReport {
            ranked,
            total_entropy: entropy,
            distributions,
        })
    }

    /// Per-trait breakdown for one item of the collection
    pub fn explain(&self, items: &[TraitMap], token_id: usize) -> Result<ItemExplanation> {
        let distributions = self.distribution(items)?;
        explain(items, &distributions, token_id)
    }
}

impl Default for RarityEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let engine = RarityEngine::default();
        assert_eq!(engine.sentinel(), "__undefined");
        assert!(engine.config().validate().is_ok());
    }

    #[test]
    fn test_invalid_sentinel() {
        for sentinel in ["", "  ", " none"] {
            let config = EngineConfig {
                sentinel: sentinel.to_string(),
            };
            assert!(matches!(RarityEngine::new(config), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_config_serde_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_rank_report() {
        let engine = RarityEngine::default();
        let items = engine
            .parse_items(&json!([
                {"color": "red"},
                {"color": "red"},
                {"color": "blue"}
            ]))
            .unwrap();

        let report = engine.rank(&items).unwrap();
        assert_eq!(report.ranks_by_token(), vec![2, 2, 1]);
        assert!(report.total_entropy > 0.0);
        assert_eq!(report.distributions.item_count(), 3);
    }

    #[test]
    fn test_custom_sentinel() {
        let engine = RarityEngine::new(EngineConfig {
            sentinel: "none".to_string(),
        })
        .unwrap();
        let items = engine.parse_items(&json!([{"a": "x"}, {"b": "y"}])).unwrap();
        let dist = engine.distribution(&items).unwrap();
        assert_eq!(dist.proportion("a", "none"), Some(0.5));
        assert!(dist.proportion("a", "__undefined").is_none());
    }

    #[test]
    fn test_rank_is_repeatable() {
        let engine = RarityEngine::default();
        let items = engine
            .parse_items(&json!([
                {"a": "1", "b": "x"},
                {"a": "2"},
                {"b": "y", "c": "z"},
                {"a": "1", "c": "z"}
            ]))
            .unwrap();

        let first = engine.rank(&items).unwrap();
        let second = engine.rank(&items).unwrap();
        assert_eq!(first, second);
        for (a, b) in first.ranked.iter().zip(&second.ranked) {
            assert_eq!(a.score.to_bits(), b.score.to_bits());
        }
    }
}
