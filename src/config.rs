//! Engine configuration. Defaults come from [`constants`](crate::constants);
//! a TOML file may override any subset:
//!
//! ```toml
//! default_limit = 10
//!
//! [weights]
//! cross_platform_discount = 0.8
//!
//! [cache]
//! ttl = "2m"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_limit: usize,
    pub max_query_len: usize,
    /// Catalogs larger than this are scored on the rayon pool.
    pub parallel_threshold: usize,
    pub weights: ScoringWeights,
    pub normalizer: NormalizerConfig,
    pub cache: CacheConfig,
    pub fallback: FallbackConfig,
    pub loader: LoaderConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_query_len: MAX_QUERY_LEN,
            parallel_threshold: PARALLEL_THRESHOLD,
            weights: ScoringWeights::default(),
            normalizer: NormalizerConfig::default(),
            cache: CacheConfig::default(),
            fallback: FallbackConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub direct_command: f32,
    pub command: f32,
    pub description: f32,
    pub keyword_exact: f32,
    pub keyword_partial: f32,
    pub domain: f32,

    pub exact_multiplier: f32,
    pub prefix_multiplier: f32,
    pub contains_multiplier: f32,
    pub keyword_exact_multiplier: f32,
    pub description_partial_multiplier: f32,

    pub categories: CategoryWeights,

    pub intent_boost: f32,
    pub action_boost_exact: f32,
    pub action_boost_description: f32,
    pub target_boost_exact: f32,
    pub target_boost_description: f32,

    /// Applied when a platform filter is active and the entry only qualifies
    /// as cross-platform.
    pub cross_platform_discount: f32,
    pub context_boost_scale: f32,
    pub synonym_weight: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            direct_command: WEIGHT_DIRECT_COMMAND,
            command: WEIGHT_COMMAND,
            description: WEIGHT_DESCRIPTION,
            keyword_exact: WEIGHT_KEYWORD_EXACT,
            keyword_partial: WEIGHT_KEYWORD_PARTIAL,
            domain: WEIGHT_DOMAIN,
            exact_multiplier: MULT_EXACT,
            prefix_multiplier: MULT_PREFIX,
            contains_multiplier: MULT_CONTAINS,
            keyword_exact_multiplier: MULT_KEYWORD_EXACT,
            description_partial_multiplier: MULT_DESCRIPTION_PARTIAL,
            categories: CategoryWeights::default(),
            intent_boost: INTENT_BOOST,
            action_boost_exact: ACTION_BOOST_EXACT,
            action_boost_description: ACTION_BOOST_DESCRIPTION,
            target_boost_exact: TARGET_BOOST_EXACT,
            target_boost_description: TARGET_BOOST_DESCRIPTION,
            cross_platform_discount: CROSS_PLATFORM_DISCOUNT,
            context_boost_scale: CONTEXT_BOOST_SCALE,
            synonym_weight: SYNONYM_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub boosts: BTreeMap<String, f32>,
    /// This category gets `special_boost` instead of its ordinary boost.
    pub special: String,
    pub special_boost: f32,
    /// Entries in `penalized` are multiplied by `penalty` when the query
    /// points at `penalized_when`.
    pub penalized: String,
    pub penalized_when: String,
    pub penalty: f32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        let boosts = [
            ("compression", CATEGORY_BOOST_COMPRESSION),
            ("filesystem", CATEGORY_BOOST_DIRECTORY),
            ("search", CATEGORY_BOOST_SEARCH),
            ("networking", CATEGORY_BOOST_NETWORKING),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Self {
            boosts,
            special: "compression".into(),
            special_boost: CATEGORY_BOOST_SPECIAL,
            penalized: "search".into(),
            penalized_when: "compression".into(),
            penalty: CATEGORY_PENALTY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub min_token_len: usize,
    pub stopword_min_len: usize,
    /// 0 disables synonym expansion; values above 1 are rejected.
    pub max_synonyms_per_token: usize,
    pub stemming: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: MIN_TOKEN_LEN,
            stopword_min_len: STOPWORD_MIN_LEN,
            max_synonyms_per_token: MAX_SYNONYMS_PER_TOKEN,
            stemming: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub capacity: usize,
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: CACHE_CAPACITY,
            ttl: Duration::from_secs(CACHE_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Subtracted from the caller's fuzzy threshold for the relaxed pass.
    pub threshold_relaxation: i32,
    pub min_score: f32,
    pub edit_penalty: i32,
    pub max_candidates: usize,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            threshold_relaxation: FALLBACK_THRESHOLD_RELAXATION,
            min_score: FALLBACK_MIN_SCORE,
            edit_penalty: FUZZY_EDIT_PENALTY,
            max_candidates: FALLBACK_MAX_CANDIDATES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub fallback_paths: Vec<PathBuf>,
    pub retry: RetryPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fallback_paths: FALLBACK_CATALOG_PATHS.iter().map(|p| PathBuf::from(*p)).collect(),
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        let checks: [(bool, &str); 13] = [
            (self.default_limit > 0, "default_limit must be greater than 0"),
            (self.max_query_len > 0, "max_query_len must be greater than 0"),
            (
                w.exact_multiplier > w.prefix_multiplier
                    && w.prefix_multiplier > w.contains_multiplier,
                "match multipliers must satisfy exact > prefix > contains",
            ),
            (
                w.keyword_exact * w.keyword_exact_multiplier > w.keyword_partial,
                "exact keyword weight must exceed partial keyword weight",
            ),
            (
                w.action_boost_exact > w.action_boost_description
                    && w.target_boost_exact > w.target_boost_description,
                "exact action/target boosts must exceed description-only boosts",
            ),
            (
                w.intent_boost > w.action_boost_exact && w.intent_boost > w.target_boost_exact,
                "intent_boost must exceed the action and target boosts",
            ),
            (
                w.categories.special_boost >= 1.0
                    && w.categories.boosts.values().all(|b| *b >= 1.0),
                "category boosts must be at least 1",
            ),
            (
                w.categories
                    .boosts
                    .values()
                    .all(|b| w.categories.special_boost > *b),
                "special_boost must exceed every other category boost",
            ),
            (
                w.cross_platform_discount > 0.0 && w.cross_platform_discount < 1.0,
                "cross_platform_discount must be in (0, 1)",
            ),
            (
                w.categories.penalty > 0.0 && w.categories.penalty < 1.0,
                "category penalty must be in (0, 1)",
            ),
            (
                (0.0..=1.0).contains(&w.synonym_weight),
                "synonym_weight must be in [0, 1]",
            ),
            (
                self.normalizer.max_synonyms_per_token <= 1,
                "max_synonyms_per_token must be 0 or 1",
            ),
            (
                !self.cache.enabled || self.cache.capacity > 0,
                "cache capacity must be greater than 0 when the cache is enabled",
            ),
        ];
        if let Some((_, msg)) = checks.iter().find(|(ok, _)| !ok) {
            return Err(Error::Config((*msg).to_string()));
        }
        self.loader.retry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.cache.ttl, Duration::from_secs(300));
    }

    #[test]
    fn toml_overrides_subset() {
        let config = EngineConfig::from_toml_str(
            r#"
            default_limit = 10

            [weights]
            cross_platform_discount = 0.8

            [cache]
            ttl = "2m"
            capacity = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.weights.cross_platform_discount, 0.8);
        assert_eq!(config.weights.command, WEIGHT_COMMAND);
        assert_eq!(config.cache.ttl, Duration::from_secs(120));
        assert_eq!(config.cache.capacity, 16);
    }

    #[test]
    fn inverted_multipliers_rejected() {
        let mut config = EngineConfig::default();
        config.weights.prefix_multiplier = 3.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exact > prefix > contains"));
    }

    #[test]
    fn special_category_must_lead() {
        let mut config = EngineConfig::default();
        config.weights.categories.boosts.insert("networking".into(), 3.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("special_boost must exceed"));

        config.weights.categories.special_boost = 3.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn synonym_cap_enforced() {
        let err = EngineConfig::from_toml_str("[normalizer]\nmax_synonyms_per_token = 3").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("default_limit = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
