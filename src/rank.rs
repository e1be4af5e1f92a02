use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::entry::{Catalog, CommandEntry};
use crate::options::SearchOptions;

/// A catalog entry with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub entry: Arc<CommandEntry>,
    pub score: f32,
}

/// Platform and pipeline filters.
pub fn admits(entry: &CommandEntry, opts: &SearchOptions) -> bool {
    if opts.pipeline_only && !entry.is_pipeline() {
        return false;
    }
    if !opts.platform_filter_active() {
        return true;
    }
    if opts.platforms.iter().any(|p| entry.targets_platform(p)) {
        return true;
    }
    entry.is_cross_platform() && !opts.exclude_cross_platform
}

/// Filter, drop non-positive scores, sort best first and truncate.
///
/// Ties keep catalog order, so the output never depends on how `scored` was
/// produced.
pub fn rank(
    catalog: &Catalog,
    scored: Vec<(usize, f32)>,
    opts: &SearchOptions,
    limit: usize,
) -> Vec<ScoredResult> {
    let mut kept: Vec<(usize, f32)> = scored
        .into_iter()
        .filter(|&(_, score)| score > 0.0)
        .filter(|&(idx, _)| catalog.get(idx).is_some_and(|e| admits(e, opts)))
        .collect();

    kept.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    kept.truncate(limit);

    kept.into_iter()
        .filter_map(|(idx, score)| {
            catalog.get(idx).map(|entry| ScoredResult {
                entry: Arc::clone(entry),
                score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            CommandEntry::new("ls -la", "List files"),
            CommandEntry::new("dir", "List files").with_platforms(["windows"]),
            CommandEntry::new("ls --color", "List files").with_platforms(["linux", "macos"]),
            CommandEntry::new("ps aux | grep x", "Find a process"),
        ])
    }

    fn commands(results: &[ScoredResult]) -> Vec<&str> {
        results.iter().map(|r| r.entry.command()).collect()
    }

    #[test]
    fn ties_keep_catalog_order() {
        let scored = vec![(2, 5.0), (0, 5.0), (3, 9.0)];
        let results = rank(&catalog(), scored, &SearchOptions::default(), 10);
        assert_eq!(commands(&results), vec!["ps aux | grep x", "ls -la", "ls --color"]);
    }

    #[test]
    fn drops_non_positive_and_truncates() {
        let scored = vec![(0, 1.0), (1, 0.0), (2, 3.0), (3, 2.0)];
        let results = rank(&catalog(), scored, &SearchOptions::default(), 2);
        assert_eq!(commands(&results), vec!["ls --color", "ps aux | grep x"]);
    }

    #[test]
    fn platform_filter() {
        let scored = vec![(0, 1.0), (1, 1.0), (2, 1.0)];
        let linux = SearchOptions::default().with_platforms(["linux"]);
        let results = rank(&catalog(), scored.clone(), &linux, 10);
        assert_eq!(commands(&results), vec!["ls -la", "ls --color"]);

        let strict = SearchOptions {
            exclude_cross_platform: true,
            ..linux.clone()
        };
        let results = rank(&catalog(), scored.clone(), &strict, 10);
        assert_eq!(commands(&results), vec!["ls --color"]);

        let all = SearchOptions {
            all_platforms: true,
            ..strict
        };
        assert_eq!(rank(&catalog(), scored, &all, 10).len(), 3);
    }

    #[test]
    fn pipeline_only() {
        let scored = vec![(0, 1.0), (3, 1.0)];
        let opts = SearchOptions {
            pipeline_only: true,
            ..SearchOptions::default()
        };
        let results = rank(&catalog(), scored, &opts, 10);
        assert_eq!(commands(&results), vec!["ps aux | grep x"]);
    }
}
