//! The search context object tying the pipeline together.
//!
//! A [`SearchEngine`] owns the catalog, the cache and every tunable. Callers
//! build one (tests build as many independent ones as they like) and share it
//! behind an `Arc` when several threads search at once.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::cache::{CacheKey, CacheStats, ResultCache};
use crate::collab::{
    ContextAnalyzer, HistoryRecord, HistoryRecorder, NoHistory, SuggestionProvider,
};
use crate::config::EngineConfig;
use crate::entry::Catalog;
use crate::error::Result;
use crate::fallback::{self, FallbackRecovery};
use crate::loader::CatalogLoader;
use crate::normalize::{validate_query, NormalizedQuery, QueryNormalizer};
use crate::options::{current_platform, SearchOptions};
use crate::rank::{rank, ScoredResult};
use crate::scorer::Scorer;

/// Set from another thread to abandon an in-flight search.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct SearchEngine {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    normalizer: QueryNormalizer,
    scorer: Scorer,
    fallback: FallbackRecovery,
    cache: Option<ResultCache>,
    vocabulary: BTreeSet<String>,
    history: Box<dyn HistoryRecorder>,
    context: Option<Box<dyn ContextAnalyzer>>,
}

impl SearchEngine {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let normalizer =
            QueryNormalizer::new(config.normalizer.clone(), catalog.short_commands().clone());
        let cache = config
            .cache
            .enabled
            .then(|| ResultCache::from_config(&config.cache));
        let scorer = Scorer::new(config.weights.clone(), config.parallel_threshold);
        debug!(
            entries = catalog.len(),
            signals = ?scorer.signal_names(),
            cache = cache.is_some(),
            "search engine ready"
        );
        Ok(Self {
            normalizer,
            scorer,
            fallback: FallbackRecovery::new(config.fallback.clone()),
            cache,
            vocabulary: fallback::vocabulary(&catalog),
            history: Box::new(NoHistory),
            context: None,
            catalog: Arc::new(catalog),
            config,
        })
    }

    /// Load the catalog with `config.loader` and build an engine over it.
    pub fn open(primary: &Path, personal: Option<&Path>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let catalog = CatalogLoader::new(config.loader.clone()).load(primary, personal)?;
        Self::new(catalog, config)
    }

    pub fn with_history(mut self, history: Box<dyn HistoryRecorder>) -> Self {
        self.history = history;
        self
    }

    /// Boosts from `context` apply to searches that bring none of their own.
    pub fn with_context_analyzer(mut self, context: Box<dyn ContextAnalyzer>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        self.normalizer.normalize(raw)
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResultCache::stats)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Rank the catalog against `query`. An empty list is a valid answer.
    pub fn search(&self, query: &str, opts: &SearchOptions) -> Result<Vec<ScoredResult>> {
        let never = CancelFlag::new();
        Ok(self.run(query, opts, &never)?.unwrap_or_default())
    }

    /// Like [`search`](Self::search), but returns `Ok(None)` and leaves the
    /// cache untouched when `cancel` fires before the results are published.
    pub fn search_cancellable(
        &self,
        query: &str,
        opts: &SearchOptions,
        cancel: &CancelFlag,
    ) -> Result<Option<Vec<ScoredResult>>> {
        self.run(query, opts, cancel)
    }

    fn run(
        &self,
        raw: &str,
        opts: &SearchOptions,
        cancel: &CancelFlag,
    ) -> Result<Option<Vec<ScoredResult>>> {
        let started = Instant::now();
        let query = validate_query(raw, self.config.max_query_len)?;

        let mut opts = opts.clone();
        if opts.context_boosts.is_empty() {
            if let Some(context) = &self.context {
                opts.context_boosts = context.context_boosts();
            }
        }
        let limit = if opts.limit == 0 {
            self.config.default_limit
        } else {
            opts.limit
        };

        let normalized = self.normalizer.normalize(&query);
        trace!(tokens = ?normalized.tokens, synonyms = ?normalized.synonyms, "normalized query");
        let key = CacheKey::new(&normalized.signature(), &opts, limit);

        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(query = %query, "cache hit");
            self.record_history(&query, hit.len(), started);
            return Ok(Some(hit));
        }

        if cancel.is_cancelled() {
            return Ok(None);
        }
        let scored = self.scorer.score_catalog(&self.catalog, &normalized, &opts);
        if cancel.is_cancelled() {
            return Ok(None);
        }

        let mut results = rank(&self.catalog, scored, &opts, limit);
        if results.is_empty() {
            debug!(query = %query, "no direct matches, running fallback recovery");
            results = self.fallback.recover(&normalized, &self.catalog, &opts, limit);
        }

        if cancel.is_cancelled() {
            debug!(query = %query, "search superseded, discarding results");
            return Ok(None);
        }
        if let Some(cache) = &self.cache {
            cache.put(key, results.clone());
        }
        debug!(
            query = %query,
            results = results.len(),
            elapsed = ?started.elapsed(),
            "search finished"
        );
        self.record_history(&query, results.len(), started);
        Ok(Some(results))
    }

    fn record_history(&self, query: &str, count: usize, started: Instant) {
        let context = self.context.as_ref().map(|c| c.describe()).unwrap_or_default();
        let record = HistoryRecord::new(query, count, &context, started.elapsed());
        if let Err(e) = self.history.record(&record) {
            warn!("could not record search history: {e}");
        }
    }

    /// Catalog words close to the query's unknown words.
    pub fn suggest(&self, query: &str, max: usize) -> Vec<String> {
        fallback::suggest(query, &self.vocabulary, max)
    }

    /// Ask an external provider. Only ever called on the caller's request.
    pub fn ai_fallback(&self, query: &str, provider: &dyn SuggestionProvider) -> Result<String> {
        let query = validate_query(query, self.config.max_query_len)?;
        provider.generate(&query, &self.system_context())
    }

    fn system_context(&self) -> String {
        let mut ctx = format!(
            "You suggest a single shell command for {}. Reply with the command only.",
            current_platform()
        );
        if let Some(project) = self.context.as_ref().map(|c| c.describe()).filter(|d| !d.is_empty()) {
            ctx.push_str(&format!(" The working directory is a {project} project."));
        }
        ctx
    }
}

/// Run one search and print it the way the command-line front end shows it.
pub fn search_and_print(engine: &SearchEngine, query: &str, opts: &SearchOptions) {
    println!("\nQuery: '{query}'");

    let results = match engine.search(query, opts) {
        Ok(results) => results,
        Err(e) => {
            println!("  {e}");
            return;
        }
    };
    let normalized = engine.normalize(query);
    println!("  Tokens: {:?}", normalized.tokens);

    if results.is_empty() {
        println!("  No results found.");
        let suggestions = engine.suggest(query, 3);
        if !suggestions.is_empty() {
            println!("  Did you mean: {}?", suggestions.join(", "));
        }
        return;
    }

    for r in &results {
        let preview = if r.entry.description().is_empty() {
            String::new()
        } else {
            format!(" -> {}", r.entry.description())
        };
        println!("  [{:.3}] {}{}", r.score, r.entry.command(), preview);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::entry::CommandEntry;
    use crate::error::Error;

    fn engine() -> SearchEngine {
        let catalog = Catalog::new(vec![
            CommandEntry::new("ls -la", "List files"),
            CommandEntry::new("tar -czf archive.tar.gz dir/", "Create compressed archive of directory")
                .with_keywords(["tar", "compress", "archive"])
                .with_category("compression"),
        ]);
        SearchEngine::new(catalog, EngineConfig::default()).unwrap()
    }

    #[test]
    fn second_search_hits_the_cache() {
        let engine = engine();
        let opts = SearchOptions::default();
        let first = engine.search("compress a directory", &opts).unwrap();
        let second = engine.search("compress a directory", &opts).unwrap();
        assert_eq!(first, second);
        let stats = engine.cache_stats().unwrap();
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn invalid_queries_are_rejected() {
        let engine = engine();
        let err = engine.search("   ", &SearchOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let long = "x".repeat(1001);
        assert!(engine.search(&long, &SearchOptions::default()).is_err());
    }

    #[test]
    fn cancelled_search_publishes_nothing() {
        let engine = engine();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let out = engine
            .search_cancellable("list files", &SearchOptions::default(), &cancel)
            .unwrap();
        assert!(out.is_none());
        assert_eq!(engine.cache_stats().unwrap().size, 0);
    }

    struct FailingHistory;

    impl HistoryRecorder for FailingHistory {
        fn record(&self, _: &HistoryRecord) -> Result<()> {
            Err(Error::Config("disk full".into()))
        }
    }

    #[test]
    fn history_failures_do_not_affect_results() {
        let plain = engine().search("list files", &SearchOptions::default()).unwrap();
        let failing = engine()
            .with_history(Box::new(FailingHistory))
            .search("list files", &SearchOptions::default())
            .unwrap();
        assert_eq!(plain, failing);
    }

    struct Echo(Mutex<Vec<String>>);

    impl SuggestionProvider for Echo {
        fn generate(&self, query: &str, system_context: &str) -> Result<String> {
            self.0.lock().unwrap().push(system_context.to_string());
            Ok(format!("echo {query}"))
        }
    }

    #[test]
    fn ai_fallback_only_on_request() {
        let engine = engine();
        let provider = Echo(Mutex::new(Vec::new()));
        engine.search("nothing matches this", &SearchOptions::default()).unwrap();
        assert!(provider.0.lock().unwrap().is_empty());

        let answer = engine.ai_fallback("say  hi", &provider).unwrap();
        assert_eq!(answer, "echo say hi");
        assert_eq!(provider.0.lock().unwrap().len(), 1);
    }
}
