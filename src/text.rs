use rust_stemmers::{Algorithm, Stemmer};

pub fn make_stemmer() -> Stemmer {
    Stemmer::create(Algorithm::English)
}

pub fn is_stop_word(w: &str) -> bool {
    matches!(
        w,
        "a" | "an" | "the" | "and" | "or" | "but" | "if" | "then" | "else"
        | "when" | "while" | "where" | "why" | "how" | "what" | "which" | "who"
        | "of" | "to" | "in" | "on" | "at" | "by" | "for" | "with" | "about"
        | "from" | "into" | "over" | "after" | "before" | "does" | "between"
        | "through" | "during" | "within" | "is" | "are" | "was" | "were"
        | "be" | "been" | "being" | "do" | "will" | "did" | "doing" | "have"
        | "has" | "had" | "having" | "can" | "could" | "should" | "would"
        | "may" | "might" | "must" | "such" | "shall" | "as" | "it" | "its"
        | "it's" | "this" | "that" | "these" | "those" | "he" | "she" | "they"
        | "them" | "their" | "there" | "here" | "we" | "you" | "your" | "i"
        | "me" | "my" | "our" | "us" | "no" | "than" | "too" | "very" | "also"
        | "just" | "only" | "even" | "some" | "any" | "each" | "so" | "like"
        | "want" | "need" | "please" | "way" | "using" | "up" | "out"
    )
}

/// Lowercase `text` and split it on whitespace and punctuation.
///
/// `-` and `_` stay inside words so flags and snake_case names survive.
/// Pieces without any alphanumeric character are dropped.
pub fn split_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '-' && c != '_')
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .map(|w| w.to_lowercase())
}

/// Stem every word of `text`, skipping stop words.
pub fn stem_words(text: &str, stemmer: &Stemmer) -> Vec<String> {
    split_words(text)
        .filter(|w| !is_stop_word(w))
        .map(|w| stemmer.stem(w.trim_matches('-')).into_owned())
        .collect()
}

/// True when `needle` occurs in `haystack` delimited by non-word characters.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

/// Edit distance counting an adjacent swap as one edit, bailing out early
/// when `max_dist` is exceeded.
pub fn edit_distance(a: &str, b: &str, max_dist: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (m, n) = (a.len(), b.len());

    if m.abs_diff(n) > max_dist {
        return max_dist + 1;
    }

    let mut before = vec![0usize; n + 1];
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        let mut row_min = i;
        for j in 1..=n {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut d = (prev[j - 1] + cost).min(prev[j] + 1).min(curr[j - 1] + 1);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d = d.min(before[j - 2] + 1);
            }
            curr[j] = d;
            row_min = row_min.min(d);
        }
        if row_min > max_dist {
            return max_dist + 1;
        }
        std::mem::swap(&mut before, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_flags_and_drops_punctuation() {
        let words: Vec<String> = split_words("Tar -czf, (archive)!  ... --").collect();
        assert_eq!(words, vec!["tar", "-czf", "archive"]);
    }

    #[test]
    fn stems_description_words() {
        let stemmer = make_stemmer();
        let stems = stem_words("Create compressed archive of directory", &stemmer);
        assert!(stems.contains(&"compress".to_string()));
        assert!(!stems.iter().any(|s| s == "of"));
    }

    #[test]
    fn word_containment_respects_boundaries() {
        assert!(contains_word("ls -la", "ls"));
        assert!(contains_word("git commit -m", "commit"));
        assert!(!contains_word("false", "ls"));
        assert!(!contains_word("tools list", "ls"));
        assert!(contains_word("find . -name", "-name"));
    }

    #[test]
    fn edit_distance_bounds() {
        assert_eq!(edit_distance("rsync", "rsnc", 2), 1);
        assert_eq!(edit_distance("grep", "grep", 1), 0);
        assert_eq!(edit_distance("kitten", "sitting", 3), 3);
        assert_eq!(edit_distance("tar", "docker", 1), 2);
        assert_eq!(edit_distance("sl", "ls", 1), 1);
        assert_eq!(edit_distance("gerp", "grep", 2), 1);
    }
}
