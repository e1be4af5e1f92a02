use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FUZZY_THRESHOLD;

/// Per-call search knobs. Built fresh for every search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Maximum results; 0 means the engine default.
    pub limit: usize,
    /// Allow the edit-distance part of fallback recovery.
    pub use_fuzzy: bool,
    /// More negative is more permissive.
    pub fuzzy_threshold: i32,
    /// Apply intent, action and target boosts.
    pub use_nlp: bool,
    /// Category or keyword to additive weight.
    pub context_boosts: BTreeMap<String, f32>,
    /// Requested platform labels; empty means no platform filter.
    pub platforms: Vec<String>,
    pub all_platforms: bool,
    pub exclude_cross_platform: bool,
    pub pipeline_only: bool,
    /// Multiplier for pipeline entries; values <= 1 disable it.
    pub pipeline_boost: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            use_fuzzy: false,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            use_nlp: true,
            context_boosts: BTreeMap::new(),
            platforms: Vec::new(),
            all_platforms: false,
            exclude_cross_platform: false,
            pipeline_only: false,
            pipeline_boost: 0.0,
        }
    }
}

impl SearchOptions {
    /// Options filtered to the platform this binary was built for.
    pub fn for_current_platform() -> Self {
        Self {
            platforms: vec![current_platform().to_string()],
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_fuzzy(mut self, use_fuzzy: bool) -> Self {
        self.use_fuzzy = use_fuzzy;
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_context_boosts(mut self, boosts: BTreeMap<String, f32>) -> Self {
        self.context_boosts = boosts;
        self
    }

    pub fn platform_filter_active(&self) -> bool {
        !self.all_platforms && !self.platforms.is_empty()
    }
}

/// Catalog platform label for the running OS.
pub fn current_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macos",
        "windows" => "windows",
        _ => "linux",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_platforms_disable_filter() {
        assert!(!SearchOptions::default().platform_filter_active());
        assert!(SearchOptions::for_current_platform().platform_filter_active());

        let all = SearchOptions {
            all_platforms: true,
            ..SearchOptions::for_current_platform()
        };
        assert!(!all.platform_filter_active());
    }
}
