use std::collections::HashSet;

use proptest::prelude::*;

use cmd_finder::config::{NormalizerConfig, ScoringWeights};
use cmd_finder::normalize::{NormalizedQuery, QueryNormalizer};
use cmd_finder::scorer::Scorer;
use cmd_finder::text::is_stop_word;
use cmd_finder::{Catalog, CommandEntry, EngineConfig, SearchEngine, SearchOptions};

const VOCAB: &[&str] = &[
    "list", "files", "compress", "directory", "archive", "find", "text", "process", "kill",
    "network", "download", "install", "package", "copy", "remove", "folder", "search", "git",
    "status", "disk", "space", "create", "show", "permissions", "tar", "grep", "ls",
];

const CATEGORIES: &[&str] = &["compression", "filesystem", "search", "networking", "process", "git"];
const PLATFORMS: &[&str] = &["linux", "macos", "windows", "cross-platform"];

fn word() -> impl Strategy<Value = String> {
    prop::sample::select(VOCAB).prop_map(str::to_string)
}

fn command_name() -> impl Strategy<Value = String> {
    prop_oneof![word(), "[a-z]{3,8}".prop_filter("not a stop word", |w| !is_stop_word(w))]
}

prop_compose! {
    fn entry()(
        head in command_name(),
        args in prop::collection::vec(word(), 0..3),
        description in prop::collection::vec(word(), 0..6),
        keywords in prop::collection::vec(word(), 0..4),
        category in prop::option::of(prop::sample::select(CATEGORIES)),
        platforms in prop::collection::vec(prop::sample::select(PLATFORMS), 0..3),
    ) -> CommandEntry {
        let mut command = head;
        for a in args {
            command.push(' ');
            command.push_str(&a);
        }
        let mut e = CommandEntry::new(command, description.join(" "))
            .with_keywords(keywords)
            .with_platforms(platforms);
        if let Some(c) = category {
            e = e.with_category(c);
        }
        e
    }
}

fn query_text() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..5).prop_map(|w| w.join(" "))
}

fn normalizer() -> QueryNormalizer {
    QueryNormalizer::new(NormalizerConfig::default(), HashSet::new())
}

fn scorer() -> Scorer {
    Scorer::new(ScoringWeights::default(), usize::MAX)
}

proptest! {
    #[test]
    fn empty_query_scores_zero(e in entry(), fuzzy in any::<bool>(), nlp in any::<bool>()) {
        let opts = SearchOptions { use_fuzzy: fuzzy, use_nlp: nlp, ..SearchOptions::default() };
        prop_assert_eq!(scorer().score(&e, &NormalizedQuery::default(), &opts), 0.0);
    }

    #[test]
    fn naming_the_command_never_lowers_the_score(
        head in command_name(),
        description in prop::collection::vec(word(), 0..6),
        keywords in prop::collection::vec(word(), 0..4),
        category in prop::option::of(prop::sample::select(CATEGORIES)),
        q in query_text(),
    ) {
        let mut e = CommandEntry::new(head.clone(), description.join(" ")).with_keywords(keywords);
        if let Some(c) = category {
            e = e.with_category(c);
        }
        let n = normalizer();
        let s = scorer();
        let opts = SearchOptions::default();

        let without = s.score(&e, &n.normalize(&q), &opts);
        let with = s.score(&e, &n.normalize(&format!("{q} {head}")), &opts);
        prop_assert!(with >= without * (1.0 - 1e-5) - 1e-4, "{} < {}", with, without);
    }

    #[test]
    fn search_twice_gives_the_same_list(
        entries in prop::collection::vec(entry(), 1..20),
        q in query_text(),
        fuzzy in any::<bool>(),
    ) {
        let engine = SearchEngine::new(Catalog::new(entries), EngineConfig::default()).unwrap();
        let opts = SearchOptions::default().with_fuzzy(fuzzy).with_limit(10);
        let first = engine.search(&q, &opts).unwrap();
        let second = engine.search(&q, &opts).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn strict_platform_filter_only_returns_tagged_entries(
        entries in prop::collection::vec(entry(), 1..20),
        q in query_text(),
        fuzzy in any::<bool>(),
    ) {
        let engine = SearchEngine::new(Catalog::new(entries), EngineConfig::default()).unwrap();
        let opts = SearchOptions {
            exclude_cross_platform: true,
            use_fuzzy: fuzzy,
            ..SearchOptions::default().with_platforms(["linux"]).with_limit(20)
        };
        for r in engine.search(&q, &opts).unwrap() {
            prop_assert!(r.entry.targets_platform("linux"), "{}", r.entry.command());
        }
    }

    #[test]
    fn results_are_sorted_and_positive(
        entries in prop::collection::vec(entry(), 1..20),
        q in query_text(),
    ) {
        let engine = SearchEngine::new(Catalog::new(entries), EngineConfig::default()).unwrap();
        let results = engine.search(&q, &SearchOptions::default().with_limit(20)).unwrap();
        prop_assert!(results.iter().all(|r| r.score > 0.0));
        prop_assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
