/*!
 * Per-word reading results and the accuracy score derived from them.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome for a single target word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    /// Read as written
    Ok,
    /// Replaced by other words or skipped
    Misread,
}

impl fmt::Display for WordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordStatus::Ok => write!(f, "ok"),
            WordStatus::Misread => write!(f, "misread"),
        }
    }
}

/// Result for one word of the target passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordResult {
    /// Normalized target word
    pub word: String,
    /// Whether the reader got it right
    pub status: WordStatus,
}

impl WordResult {
    pub fn ok(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            status: WordStatus::Ok,
        }
    }

    pub fn misread(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            status: WordStatus::Misread,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == WordStatus::Ok
    }
}

/// Scored alignment of a transcript against a target passage
///
/// Holds exactly one entry per target word, in target order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// One result per target word
    pub words: Vec<WordResult>,
    /// Percentage of target words read correctly, one decimal place
    pub accuracy: f64,
}

impl AlignmentReport {
    /// Build a report, deriving the accuracy from the word results
    pub fn from_words(words: Vec<WordResult>) -> Self {
        let correct = words.iter().filter(|w| w.is_ok()).count();
        let accuracy = accuracy_percent(correct, words.len());
        Self { words, accuracy }
    }

    /// Number of target words read correctly
    pub fn correct_count(&self) -> usize {
        self.words.iter().filter(|w| w.is_ok()).count()
    }

    /// Number of target words
    pub fn total(&self) -> usize {
        self.words.len()
    }

    /// Misread words in target order, duplicates kept
    pub fn misread_words(&self) -> Vec<String> {
        self.words
            .iter()
            .filter(|w| !w.is_ok())
            .map(|w| w.word.clone())
            .collect()
    }
}

/// `round(100 * correct / max(1, total), 1)`
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    let raw = 100.0 * correct as f64 / total.max(1) as f64;
    round_to_tenth(raw)
}

/// Round to one decimal place, ties to even, judged on the exact binary value
///
/// `x * 10.0` can land on a half even when `x` itself is slightly above or
/// below one; the fused residual recovers which side the exact product is on.
pub fn round_to_tenth(x: f64) -> f64 {
    let scaled = x * 10.0;
    let residual = x.mul_add(10.0, -scaled);
    let floor = scaled.floor();

    let rounded = if scaled - floor == 0.5 {
        if residual > 0.0 {
            floor + 1.0
        } else if residual < 0.0 {
            floor
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };

    rounded / 10.0
}
