use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref MARKUP: Regex =
        Regex::new(r"(?s)<[^>]*>|&[a-zA-Z]+;|&#[0-9]+;").expect("valid regex");
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = [
        "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be",
        "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from",
        "had", "has", "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it",
        "its", "may", "more", "most", "no", "not", "of", "on", "one", "or", "other", "our",
        "out", "she", "should", "so", "some", "such", "than", "that", "the", "their", "them",
        "then", "there", "these", "they", "this", "those", "to", "up", "was", "we", "were",
        "what", "when", "which", "who", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect();
}

/// Controls which tokens reach the local table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    pub stem: bool,
    pub remove_stopwords: bool,
    /// Tokens shorter than this many characters are skipped.
    pub min_len: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self { stem: true, remove_stopwords: true, min_len: 2 }
    }
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenize with the default options.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, &TokenizerOptions::default())
}

/// Strip markup, NFKC-normalize and lowercase, then split into letter-led words.
pub fn tokenize_with(text: &str, opts: &TokenizerOptions) -> Vec<String> {
    let stripped = MARKUP.replace_all(text, " ");
    let normalized = stripped.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&normalized)
        .map(|m| m.as_str().trim_end_matches('\''))
        .filter(|w| w.chars().count() >= opts.min_len)
        .filter(|w| !(opts.remove_stopwords && is_stopword(w)))
        .map(|w| if opts.stem { STEMMER.stem(w).into_owned() } else { w.to_string() })
        .filter(|w| !w.is_empty())
        .collect()
}
