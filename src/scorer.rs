//! Combines the signals into one relevance score per entry.
//!
//! Order of operations for an entry with a positive token subtotal:
//! category boost, intent boosts (when `use_nlp`), pipeline boost,
//! cross-platform discount, then the additive context boost.

use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::config::ScoringWeights;
use crate::entry::{Catalog, CommandEntry};
use crate::normalize::NormalizedQuery;
use crate::options::SearchOptions;
use crate::signals::{command_mentions, default_signals, Signal};

/// Why an entry was left out of a scoring batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreSkip {
    #[error("entry has no command text")]
    BlankCommand,
    #[error("score is not a finite number")]
    NonFinite,
}

pub struct Scorer {
    weights: ScoringWeights,
    signals: Vec<Box<dyn Signal>>,
    parallel_threshold: usize,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, parallel_threshold: usize) -> Self {
        Self {
            weights,
            signals: default_signals(),
            parallel_threshold,
        }
    }

    /// Add an extra signal; it is summed with the others before any boost.
    pub fn with_signal(mut self, signal: Box<dyn Signal>) -> Self {
        self.signals.push(signal);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn signal_names(&self) -> Vec<&'static str> {
        self.signals.iter().map(|s| s.name()).collect()
    }

    /// Score of `entry`, with malformed entries counting as 0.
    pub fn score(&self, entry: &CommandEntry, query: &NormalizedQuery, opts: &SearchOptions) -> f32 {
        self.try_score(entry, query, opts).unwrap_or(0.0)
    }

    pub fn try_score(
        &self,
        entry: &CommandEntry,
        query: &NormalizedQuery,
        opts: &SearchOptions,
    ) -> Result<f32, ScoreSkip> {
        if entry.folded().command.is_empty() {
            return Err(ScoreSkip::BlankCommand);
        }
        if query.is_empty() {
            return Ok(0.0);
        }
        let w = &self.weights;

        let mut subtotal: f32 = self
            .signals
            .iter()
            .map(|s| s.query_score(query, entry, w))
            .sum();
        for term in query.terms(w.synonym_weight) {
            for signal in &self.signals {
                subtotal += term.weight * signal.term_score(&term, entry, w);
            }
        }
        if subtotal <= 0.0 {
            return Ok(0.0);
        }

        subtotal *= self.category_multiplier(entry, query);
        if opts.use_nlp {
            subtotal *= self.intent_multiplier(entry, query);
        }
        if opts.pipeline_boost > 1.0 && entry.is_pipeline() {
            subtotal *= opts.pipeline_boost;
        }
        if opts.platform_filter_active()
            && entry.is_cross_platform()
            && !opts.platforms.iter().any(|p| entry.targets_platform(p))
        {
            subtotal *= w.cross_platform_discount;
        }

        let score = subtotal + context_boost(entry, opts) * w.context_boost_scale;
        if !score.is_finite() {
            return Err(ScoreSkip::NonFinite);
        }
        Ok(score.max(0.0))
    }

    /// Score every entry, returning `(catalog index, score)` for positive
    /// scores only, in catalog order.
    pub fn score_catalog(
        &self,
        catalog: &Catalog,
        query: &NormalizedQuery,
        opts: &SearchOptions,
    ) -> Vec<(usize, f32)> {
        let score_one = |(idx, entry): (usize, &std::sync::Arc<CommandEntry>)| {
            match self.try_score(entry, query, opts) {
                Ok(score) if score > 0.0 => Some((idx, score)),
                Ok(_) => None,
                Err(skip) => {
                    warn!(command = entry.command(), "skipping entry: {skip}");
                    None
                }
            }
        };

        if catalog.len() > self.parallel_threshold {
            catalog
                .entries()
                .par_iter()
                .enumerate()
                .filter_map(score_one)
                .collect()
        } else {
            catalog
                .entries()
                .iter()
                .enumerate()
                .filter_map(score_one)
                .collect()
        }
    }

    fn category_multiplier(&self, entry: &CommandEntry, query: &NormalizedQuery) -> f32 {
        let cw = &self.weights.categories;
        let Some(category) = entry.folded().category.as_deref() else {
            return 1.0;
        };
        // A term naming the command outright is never penalized.
        let direct_hit = query.tokens.iter().any(|t| *t == entry.folded().command);

        let mut mult = 1.0;
        for &wanted in &query.categories {
            if wanted == category {
                mult *= if wanted == cw.special {
                    cw.special_boost
                } else {
                    cw.boosts.get(wanted).copied().unwrap_or(1.0)
                };
            } else if wanted == cw.penalized_when && category == cw.penalized && !direct_hit {
                mult *= cw.penalty;
            }
        }
        mult
    }

    fn intent_multiplier(&self, entry: &CommandEntry, query: &NormalizedQuery) -> f32 {
        let w = &self.weights;
        let f = entry.folded();
        let mut mult = 1.0;

        let intent_hit = query
            .intents
            .iter()
            .any(|i| i.command_terms().iter().any(|t| command_mentions(entry, t)));
        if intent_hit {
            mult *= w.intent_boost;
        }

        for action in &query.actions {
            if command_mentions(entry, action) {
                mult *= w.action_boost_exact;
            } else if f.description.contains(*action) {
                mult *= w.action_boost_description;
            }
        }
        for target in &query.targets {
            if command_mentions(entry, target) {
                mult *= w.target_boost_exact;
            } else if f.description.contains(*target) {
                mult *= w.target_boost_description;
            }
        }
        mult
    }
}

/// Sum of the caller's boosts whose key is the entry's category or one of
/// its keywords.
fn context_boost(entry: &CommandEntry, opts: &SearchOptions) -> f32 {
    let f = entry.folded();
    opts.context_boosts
        .iter()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            f.category.as_deref() == Some(key.as_str()) || f.keywords.iter().any(|k| *k == key)
        })
        .map(|(_, boost)| *boost)
        .sum()
}
