//! Word extraction, stopword filtering and stemming.
//!
//! Indexing tokenisation drops stopwords; query tokenisation keeps
//! them. Both apply the length bounds and the Porter stemmer.

mod stemmer;

pub use stemmer::stem;

use std::collections::HashSet;
use std::sync::LazyLock;

pub const MIN_WORD_LENGTH: usize = 2;
pub const MAX_WORD_LENGTH: usize = 50;

/// Fixed English closed-class word list.
pub static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "and", "of", "to", "in", "is", "it", "for", "on", "with", "as", "by", "at",
        "be", "this", "that", "from", "or", "an", "are", "was", "were", "has", "have", "had",
        "not", "but", "will", "would", "could", "should", "can", "may", "do", "does", "did",
        "if", "so", "no", "yes", "we", "you", "he", "she", "they", "i", "me", "my", "your",
        "his", "her", "its", "our", "their", "them", "there", "here", "what", "which", "who",
        "when", "where", "why", "how", "all", "each", "every", "both", "few", "more", "most",
        "other", "some", "any", "only", "own", "same", "than", "too", "very", "just", "also",
        "now", "about", "after", "before", "between", "during", "through", "under", "above",
        "below", "up", "down", "out", "off", "over", "again", "further", "once", "am", "been",
        "being", "him", "us", "hers", "ours", "theirs", "yours", "into", "such", "then",
        "these",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Characters that may occur inside a token: ASCII alphanumerics, Greek,
/// and the Latin extended ranges.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || ('\u{0391}'..='\u{03e1}').contains(&c)
        || ('\u{00c0}'..='\u{024f}').contains(&c)
        || ('\u{1e00}'..='\u{1eff}').contains(&c)
}

/// A term emitted for one field, with its 0-based token position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub position: u32,
}

/// Tokenise a field for indexing: length bounds, lowercase, stopword
/// filter, stem. Stopwords consume a position but emit no term.
pub fn tokenize_field(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut position = 0u32;
    for word in words(text) {
        let lowered = word.to_lowercase();
        if is_stopword(&lowered) {
            position += 1;
            continue;
        }
        tokens.push(Token {
            term: stem(&lowered),
            position,
        });
        position += 1;
    }
    tokens
}

/// Tokenise a query: stopwords are kept, length bounds and stemming
/// still apply.
pub fn tokenize_query(text: &str) -> Vec<String> {
    words(text)
        .map(|word| stem(&word.to_lowercase()))
        .collect()
}

/// Maximal word-character spans within the length bounds.
fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| !is_word_char(c)).filter(|word| {
        let len = word.chars().count();
        (MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&len)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(text: &str) -> Vec<String> {
        tokenize_field(text).into_iter().map(|t| t.term).collect()
    }

    #[test]
    fn test_stopwords_filtered_for_indexing() {
        assert_eq!(terms("the cat and the dog"), vec!["cat", "dog"]);
    }

    #[test]
    fn test_stopwords_kept_for_queries() {
        assert_eq!(tokenize_query("the cat"), vec!["the", "cat"]);
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(terms("a xy"), vec!["xy"]);
        let long = "x".repeat(51);
        assert!(terms(&long).is_empty());
        let max = "x".repeat(50);
        assert_eq!(terms(&max).len(), 1);
    }

    #[test]
    fn test_positions_count_stopwords() {
        let tokens = tokenize_field("the cat sat on the mat");
        // "the"(0) cat(1) sat(2) "on"(3) "the"(4) mat(5)
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].position, 1);
        assert_eq!(tokens[1].position, 2);
        assert_eq!(tokens[2].position, 5);
    }

    #[test]
    fn test_unicode_ranges() {
        assert_eq!(terms("Ελλάδα"), vec!["ελλάδα"]);
        assert_eq!(terms("café naïve"), vec!["café", "naïve"]);
    }

    #[test]
    fn test_stemming_applied() {
        assert_eq!(terms("cats hopping"), vec!["cat", "hop"]);
        assert_eq!(tokenize_query("ponies"), vec!["poni"]);
    }

    #[test]
    fn test_punctuation_splits() {
        assert_eq!(terms("rock-and-roll"), vec!["rock", "roll"]);
        assert_eq!(terms("user@example.com"), vec!["user", "example", "com"]);
    }
}
