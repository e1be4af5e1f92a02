//! Scoring signals. Each signal turns one kind of evidence into a raw
//! subscore; the [`Scorer`](crate::scorer::Scorer) sums them and applies the
//! boosts.

use crate::config::ScoringWeights;
use crate::entry::CommandEntry;
use crate::normalize::{NormalizedQuery, Term};
use crate::text::contains_word;
use crate::thesaurus;

/// Terms shorter than this only ever match whole words.
const SUBSTRING_MIN_LEN: usize = 3;

pub trait Signal: Send + Sync {
    fn name(&self) -> &'static str;

    /// Contribution of a single query term, before the term's weight.
    fn term_score(&self, term: &Term<'_>, entry: &CommandEntry, w: &ScoringWeights) -> f32;

    fn query_score(&self, _query: &NormalizedQuery, _entry: &CommandEntry, _w: &ScoringWeights) -> f32 {
        0.0
    }
}

pub fn default_signals() -> Vec<Box<dyn Signal>> {
    vec![
        Box::new(FullCommand),
        Box::new(CommandToken),
        Box::new(DescriptionToken),
        Box::new(KeywordToken),
        Box::new(DomainTerm),
    ]
}

fn long_enough(term: &str) -> bool {
    term.chars().count() >= SUBSTRING_MIN_LEN
}

/// The query words are exactly the command's words.
pub struct FullCommand;

impl Signal for FullCommand {
    fn name(&self) -> &'static str {
        "full_command"
    }

    fn term_score(&self, _: &Term<'_>, _: &CommandEntry, _: &ScoringWeights) -> f32 {
        0.0
    }

    fn query_score(&self, query: &NormalizedQuery, entry: &CommandEntry, w: &ScoringWeights) -> f32 {
        let mut words: Vec<&String> = Vec::new();
        for word in &entry.folded().command_words {
            if !words.contains(&word) {
                words.push(word);
            }
        }
        if !query.is_empty() && query.tokens.iter().eq(words) {
            w.direct_command * w.exact_multiplier
        } else {
            0.0
        }
    }
}

/// A term against the command text: exact, then leading word, then prefix of
/// the leading word, then any word, then substring.
pub struct CommandToken;

impl Signal for CommandToken {
    fn name(&self) -> &'static str {
        "command"
    }

    fn term_score(&self, term: &Term<'_>, entry: &CommandEntry, w: &ScoringWeights) -> f32 {
        let f = entry.folded();
        let t = term.text;
        if t == f.command {
            w.direct_command * w.exact_multiplier
        } else if t == f.head {
            w.direct_command * w.prefix_multiplier
        } else if long_enough(t) && f.head.starts_with(t) {
            w.command * w.prefix_multiplier
        } else if f.command_words.iter().any(|cw| cw == t) {
            w.command
        } else if long_enough(t) && f.command.contains(t) {
            w.command * w.contains_multiplier
        } else {
            0.0
        }
    }
}

pub struct DescriptionToken;

impl Signal for DescriptionToken {
    fn name(&self) -> &'static str {
        "description"
    }

    fn term_score(&self, term: &Term<'_>, entry: &CommandEntry, w: &ScoringWeights) -> f32 {
        let f = entry.folded();
        if f.description_words.contains(term.text) || f.description_stems.contains(term.stem) {
            w.description
        } else if long_enough(term.text) && f.description.contains(term.text) {
            w.description * w.description_partial_multiplier
        } else {
            0.0
        }
    }
}

pub struct KeywordToken;

impl Signal for KeywordToken {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn term_score(&self, term: &Term<'_>, entry: &CommandEntry, w: &ScoringWeights) -> f32 {
        let keywords = &entry.folded().keywords;
        if keywords.iter().any(|k| k == term.text) {
            w.keyword_exact * w.keyword_exact_multiplier
        } else if long_enough(term.text) && keywords.iter().any(|k| k.contains(term.text)) {
            w.keyword_partial
        } else {
            0.0
        }
    }
}

/// A domain word ("compress", "network") naming the entry's command or its
/// category.
pub struct DomainTerm;

impl Signal for DomainTerm {
    fn name(&self) -> &'static str {
        "domain"
    }

    fn term_score(&self, term: &Term<'_>, entry: &CommandEntry, w: &ScoringWeights) -> f32 {
        let f = entry.folded();
        let by_command = thesaurus::domain_commands(term.text)
            .is_some_and(|cmds| cmds.iter().any(|c| *c == f.head));
        let by_category = match (thesaurus::category_for_term(term.text), f.category.as_deref()) {
            (Some(want), Some(have)) => want == have,
            _ => false,
        };
        if by_command || by_category {
            w.domain
        } else {
            0.0
        }
    }
}

/// True when `term` names the command as a whole word, or a word prefix for
/// longer terms.
pub(crate) fn command_mentions(entry: &CommandEntry, term: &str) -> bool {
    let f = entry.folded();
    contains_word(&f.command, term) || (long_enough(term) && f.head.starts_with(term))
}
