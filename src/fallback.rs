//! Relaxed second pass for queries the main pipeline could not match, and
//! "did you mean" suggestions built from the catalog vocabulary.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::config::FallbackConfig;
use crate::constants::{FUZZY_MIN_LEN, FUZZY_SHORT_MIN_LEN};
use crate::entry::{Catalog, CommandEntry};
use crate::normalize::NormalizedQuery;
use crate::options::SearchOptions;
use crate::rank::{admits, ScoredResult};
use crate::text::{edit_distance, is_stop_word, split_words};

pub struct FallbackRecovery {
    config: FallbackConfig,
}

impl FallbackRecovery {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    /// Most edits a word of `len` chars may carry under `threshold`.
    fn max_edits(&self, len: usize, threshold: i32) -> usize {
        let relaxed = threshold.saturating_sub(self.config.threshold_relaxation);
        let by_threshold = if self.config.edit_penalty > 0 {
            (relaxed.saturating_neg() / self.config.edit_penalty).max(0) as usize
        } else {
            usize::MAX
        };
        by_threshold.min((len / 3).max(1))
    }

    /// Token-overlap similarity for every query token, plus edit-distance
    /// similarity when `use_fuzzy` is set. Never fails; an empty list is a
    /// valid answer, and a query with no surviving tokens always gets one.
    pub fn recover(
        &self,
        query: &NormalizedQuery,
        catalog: &Catalog,
        opts: &SearchOptions,
        limit: usize,
    ) -> Vec<ScoredResult> {
        if query.tokens.is_empty() {
            return Vec::new();
        }
        let words = &query.tokens;
        let stems = &query.stems;

        let mut candidates: Vec<(usize, f32)> = catalog
            .entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| admits(e, opts))
            .filter_map(|(idx, entry)| {
                let score: f32 = words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| self.similarity(w, stems.get(i), entry, opts))
                    .sum();
                (score >= self.config.min_score).then_some((idx, score))
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        candidates.truncate(limit.min(self.config.max_candidates));
        debug!(found = candidates.len(), fuzzy = opts.use_fuzzy, "fallback recovery");

        candidates
            .into_iter()
            .filter_map(|(idx, score)| {
                catalog.get(idx).map(|entry| ScoredResult {
                    entry: Arc::clone(entry),
                    score,
                })
            })
            .collect()
    }

    /// Best similarity in (0, 1] of `word` to any word of `entry`, 0 if none.
    fn similarity(
        &self,
        word: &str,
        stem: Option<&String>,
        entry: &CommandEntry,
        opts: &SearchOptions,
    ) -> f32 {
        let f = entry.folded();
        let vocab = || {
            f.command_words
                .iter()
                .chain(&f.keywords)
                .chain(f.description_words.iter())
        };

        if vocab().any(|v| v == word) || stem.is_some_and(|s| f.description_stems.contains(s)) {
            return 1.0;
        }

        let len = word.chars().count();
        let mut best: f32 = 0.0;
        if len >= FUZZY_MIN_LEN {
            for v in vocab() {
                let vlen = v.chars().count();
                if vlen >= FUZZY_MIN_LEN && (v.starts_with(word) || word.starts_with(v.as_str())) {
                    best = best.max(len.min(vlen) as f32 / len.max(vlen) as f32);
                }
            }
        }

        if opts.use_fuzzy && len >= FUZZY_SHORT_MIN_LEN {
            let max_edits = self.max_edits(len, opts.fuzzy_threshold);
            let names = f
                .command_words
                .iter()
                .chain(&f.keywords)
                .filter(|v| v.chars().count() >= FUZZY_SHORT_MIN_LEN);
            let described = f
                .description_words
                .iter()
                .filter(|v| v.chars().count() >= FUZZY_MIN_LEN && !is_stop_word(v));
            for v in names.chain(described) {
                let d = edit_distance(word, v, max_edits);
                if d <= max_edits {
                    best = best.max(1.0 - d as f32 / len.max(v.chars().count()) as f32);
                }
            }
        }
        best
    }
}

/// Command names, command words and keywords worth suggesting.
pub fn vocabulary(catalog: &Catalog) -> BTreeSet<String> {
    catalog
        .entries()
        .iter()
        .flat_map(|e| {
            let f = e.folded();
            f.command_words.iter().chain(&f.keywords).cloned().collect::<Vec<_>>()
        })
        .filter(|w| {
            w.chars().count() >= FUZZY_SHORT_MIN_LEN
                && !w.starts_with('-')
                && w.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        })
        .collect()
}

/// Vocabulary words near the query's unknown words, closest first.
pub fn suggest(query: &str, vocab: &BTreeSet<String>, max: usize) -> Vec<String> {
    let mut scored: Vec<(usize, &String)> = Vec::new();
    for word in split_words(query) {
        let len = word.chars().count();
        if len < FUZZY_SHORT_MIN_LEN || is_stop_word(&word) || vocab.contains(&word) {
            continue;
        }
        let max_edits = (len / 3).max(1);
        for v in vocab {
            let d = edit_distance(&word, v, max_edits);
            if d <= max_edits && !scored.iter().any(|(_, s)| *s == v) {
                scored.push((d, v));
            }
        }
    }
    scored.sort();
    scored.into_iter().take(max).map(|(_, v)| v.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;
    use crate::normalize::QueryNormalizer;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CommandEntry::new("ls -la", "List files"),
            CommandEntry::new("rsync -av src/ dst/", "Synchronize directories")
                .with_keywords(["sync", "copy"]),
            CommandEntry::new("grep -r pattern .", "Search text recursively"),
        ])
    }

    fn query(raw: &str) -> NormalizedQuery {
        QueryNormalizer::new(NormalizerConfig::default(), Default::default()).normalize(raw)
    }

    fn recovery() -> FallbackRecovery {
        FallbackRecovery::new(FallbackConfig::default())
    }

    #[test]
    fn typo_found_only_with_fuzzy() {
        let catalog = catalog();
        let q = query("rsnc");
        let fuzzy = SearchOptions::default().with_fuzzy(true);

        let found = recovery().recover(&q, &catalog, &fuzzy, 5);
        assert_eq!(found[0].entry.command(), "rsync -av src/ dst/");
        assert!(recovery().recover(&q, &catalog, &SearchOptions::default(), 5).is_empty());
    }

    #[test]
    fn prefix_overlap_without_fuzzy() {
        let found = recovery().recover(&query("recursive"), &catalog(), &SearchOptions::default(), 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].entry.command(), "grep -r pattern .");
    }

    #[test]
    fn nothing_close_is_empty_not_error() {
        let found = recovery().recover(
            &query("kubernetes"),
            &catalog(),
            &SearchOptions::default().with_fuzzy(true),
            5,
        );
        assert!(found.is_empty());
    }

    fn small_catalog() -> Catalog {
        Catalog::new(vec![
            CommandEntry::new("ls -la", "List files"),
            CommandEntry::new("scp file user@host:/path", "Copy a file to a remote host"),
            CommandEntry::new("du -sh", "Show disk usage of a directory"),
        ])
    }

    #[test]
    fn short_command_typos_recovered_with_fuzzy() {
        let catalog = small_catalog();
        let fuzzy = SearchOptions::default().with_fuzzy(true);
        for typo in ["lss", "lz", "sl"] {
            let found = recovery().recover(&query(typo), &catalog, &fuzzy, 5);
            assert_eq!(found.len(), 1, "{typo}");
            assert_eq!(found[0].entry.command(), "ls -la", "{typo}");
        }
        let plain = recovery().recover(&query("lz"), &catalog, &SearchOptions::default(), 5);
        assert!(plain.is_empty());
    }

    #[test]
    fn stopword_only_query_recovers_nothing() {
        let catalog = small_catalog();
        let fuzzy = SearchOptions::default().with_fuzzy(true);
        for q in ["what is a", "to", "of the"] {
            assert!(recovery().recover(&query(q), &catalog, &fuzzy, 5).is_empty(), "{q}");
        }
    }

    #[test]
    fn description_typo_recovered_with_fuzzy() {
        let catalog = small_catalog();
        let q = query("dirctory");
        let found = recovery().recover(&q, &catalog, &SearchOptions::default().with_fuzzy(true), 5);
        assert_eq!(found[0].entry.command(), "du -sh");
        assert!(found[0].score > 0.8);
        assert!(recovery().recover(&q, &catalog, &SearchOptions::default(), 5).is_empty());
    }

    #[test]
    fn stricter_threshold_allows_fewer_edits() {
        let r = recovery();
        assert_eq!(r.max_edits(9, -30), 3);
        assert_eq!(r.max_edits(9, 0), 1);
        assert_eq!(r.max_edits(4, -30), 1);
    }

    #[test]
    fn suggests_near_words() {
        let vocab = vocabulary(&catalog());
        assert!(vocab.contains("rsync"));
        assert!(!vocab.contains("-av"));
        assert_eq!(suggest("grpe text", &vocab, 3), vec!["grep".to_string()]);
        assert!(suggest("grep", &vocab, 3).is_empty());
        assert_eq!(suggest("lss", &vocab, 3), vec!["ls".to_string()]);
        assert!(suggest("to", &vocab, 3).is_empty());
    }
}
