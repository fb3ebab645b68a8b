/*!
 * Text normalization for word alignment.
 *
 * Turns free text into a sequence of lowercase word tokens with punctuation
 * removed, so that "The cat sat!" and "the cat sat" compare equal.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Anything that is not a letter, a number, an underscore or whitespace.
///
/// Spelled out instead of `\w`, which would also keep combining marks and
/// joiners but drop numbers such as `½`.
static NON_WORD_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("static regex is valid"));

/// A single normalized word and its ordinal position in the source text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Lowercased word with punctuation stripped
    pub text: String,
    /// Zero-based index of the word in the normalized sequence
    pub position: usize,
}

impl Token {
    /// Create a token
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// The normalized word
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// Normalize text into an ordered sequence of tokens
///
/// Lowercases, drops every character that is not a word character or
/// whitespace, then splits on runs of whitespace.
pub fn normalize(text: &str) -> Vec<Token> {
    normalize_words(text)
        .into_iter()
        .enumerate()
        .map(|(position, word)| Token::new(word, position))
        .collect()
}

/// Normalize text into plain words, without position information
pub fn normalize_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let clean = NON_WORD_CHARS.replace_all(&lowered, "");

    clean.split_whitespace().map(str::to_string).collect()
}
