//! Query validation and normalization.

use std::collections::{BTreeSet, HashSet};

use rust_stemmers::Stemmer;

use crate::config::NormalizerConfig;
use crate::error::ValidationError;
use crate::text::{is_stop_word, make_stemmer, split_words};
use crate::thesaurus::{self, Intent};

/// Strip control characters and collapse whitespace, rejecting empty or
/// over-long input.
pub fn validate_query(raw: &str, max_len: usize) -> Result<String, ValidationError> {
    let len = raw.chars().count();
    if len > max_len {
        return Err(ValidationError::TooLong { len, max: max_len });
    }
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        return Err(ValidationError::Empty);
    }
    Ok(cleaned)
}

/// Tokens of one query plus everything derived from them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedQuery {
    pub text: String,
    pub tokens: Vec<String>,
    pub stems: Vec<String>,
    /// At most one thesaurus synonym per token, never repeating a token.
    pub synonyms: Vec<String>,
    pub synonym_stems: Vec<String>,
    pub actions: Vec<&'static str>,
    pub targets: Vec<&'static str>,
    pub intents: BTreeSet<Intent>,
    pub categories: BTreeSet<&'static str>,
}

impl NormalizedQuery {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Cache key text. A query with no surviving tokens is keyed by its raw
    /// text.
    pub fn signature(&self) -> String {
        if self.tokens.is_empty() {
            format!("~{}", self.text)
        } else {
            self.tokens.join(" ")
        }
    }

    pub fn terms(&self, synonym_weight: f32) -> impl Iterator<Item = Term<'_>> + '_ {
        let tokens = self.tokens.iter().zip(&self.stems).map(|(text, stem)| Term {
            text,
            stem,
            weight: 1.0,
        });
        let synonyms = self
            .synonyms
            .iter()
            .zip(&self.synonym_stems)
            .map(move |(text, stem)| Term {
                text,
                stem,
                weight: synonym_weight,
            });
        tokens.chain(synonyms)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Term<'a> {
    pub text: &'a str,
    pub stem: &'a str,
    pub weight: f32,
}

pub struct QueryNormalizer {
    config: NormalizerConfig,
    stemmer: Stemmer,
    known_short: HashSet<String>,
}

impl QueryNormalizer {
    /// `known_short` holds command names that must survive the length and
    /// stopword filters.
    pub fn new(config: NormalizerConfig, known_short: HashSet<String>) -> Self {
        Self {
            config,
            stemmer: make_stemmer(),
            known_short,
        }
    }

    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        let mut q = NormalizedQuery {
            text: raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase(),
            ..NormalizedQuery::default()
        };

        for word in split_words(raw) {
            let len = word.chars().count();
            let known = self.known_short.contains(&word);
            if len < self.config.min_token_len && !known {
                continue;
            }
            if is_stop_word(&word) && (len > self.config.stopword_min_len || !known) {
                continue;
            }
            if q.tokens.contains(&word) {
                continue;
            }
            q.stems.push(self.stem(&word));
            q.tokens.push(word);
        }

        if self.config.max_synonyms_per_token > 0 {
            for token in &q.tokens {
                if let Some(syn) = thesaurus::synonym(token) {
                    if !q.tokens.iter().any(|t| t == syn) && !q.synonyms.iter().any(|s| s == syn) {
                        q.synonym_stems.push(self.stem(syn));
                        q.synonyms.push(syn.to_string());
                    }
                }
            }
        }

        for token in &q.tokens {
            for &action in thesaurus::actions(token).unwrap_or(&[]) {
                if !q.actions.contains(&action) {
                    q.actions.push(action);
                }
                if let Some(intent) = thesaurus::intent_for_action(action) {
                    q.intents.insert(intent);
                }
            }
            for &target in thesaurus::targets(token).unwrap_or(&[]) {
                if !q.targets.contains(&target) {
                    q.targets.push(target);
                }
            }
            if let Some(intent) = thesaurus::intent_for_keyword(token) {
                q.intents.insert(intent);
            }
            if let Some(category) = thesaurus::category_for_term(token) {
                q.categories.insert(category);
            }
        }

        q
    }

    fn stem(&self, word: &str) -> String {
        if self.config.stemming {
            self.stemmer.stem(word.trim_matches('-')).into_owned()
        } else {
            word.to_string()
        }
    }
}
