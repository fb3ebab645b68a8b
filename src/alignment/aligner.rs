/*!
 * Scores a spoken transcript against a target passage.
 */

use log::trace;

use super::matcher::{Opcode, OpcodeTag, SequenceMatcher};
use super::normalize::normalize_words;
use super::report::{AlignmentReport, WordResult};
use crate::app_config::AlignmentConfig;

/// Word aligner
///
/// Stateless apart from its options, so one instance can be shared across
/// request handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aligner {
    /// Ignore very frequent transcript words as match seeds on long transcripts
    popular_word_heuristic: bool,
}

impl Aligner {
    /// Create an aligner with explicit options
    pub fn new(popular_word_heuristic: bool) -> Self {
        Self {
            popular_word_heuristic,
        }
    }

    /// Create an aligner from the alignment section of the configuration
    pub fn from_config(config: &AlignmentConfig) -> Self {
        Self::new(config.popular_word_heuristic)
    }

    /// Align a transcript against a target passage
    ///
    /// Every target word appears exactly once in the result. Words that only
    /// occur in the transcript are ignored.
    pub fn align(&self, target: &str, transcript: &str) -> AlignmentReport {
        self.align_with_opcodes(target, transcript).0
    }

    /// Align and also return the edit script the report was built from
    pub fn align_with_opcodes(&self, target: &str, transcript: &str) -> (AlignmentReport, Vec<Opcode>) {
        let target_words = normalize_words(target);
        let transcript_words = normalize_words(transcript);

        let matcher = SequenceMatcher::with_popular_word_heuristic(
            &target_words,
            &transcript_words,
            self.popular_word_heuristic,
        );
        let opcodes = matcher.opcodes();

        let mut words = Vec::with_capacity(target_words.len());
        for opcode in &opcodes {
            let target_run = &target_words[opcode.target_range()];
            match opcode.tag {
                OpcodeTag::Equal => words.extend(target_run.iter().map(WordResult::ok)),
                OpcodeTag::Replace | OpcodeTag::Delete => {
                    words.extend(target_run.iter().map(WordResult::misread))
                }
                OpcodeTag::Insert => {}
            }
        }

        let report = AlignmentReport::from_words(words);
        trace!(
            "Aligned {} target words against {} transcript words: {}/{} correct",
            target_words.len(),
            transcript_words.len(),
            report.correct_count(),
            report.total()
        );

        (report, opcodes)
    }
}

/// Align with default options
pub fn align_words(target: &str, transcript: &str) -> AlignmentReport {
    Aligner::default().align(target, transcript)
}
