/*!
 * Word alignment between a target passage and a reading transcript.
 *
 * - `normalize`: lowercase, punctuation-free word tokens
 * - `matcher`: longest-matching-block decomposition and edit opcodes
 * - `report`: per-word results and the accuracy score
 * - `aligner`: ties the three together
 */

pub mod aligner;
pub mod matcher;
pub mod normalize;
pub mod report;

pub use aligner::{align_words, Aligner};
pub use matcher::{Match, Opcode, OpcodeTag, SequenceMatcher};
pub use normalize::{normalize, normalize_words, Token};
pub use report::{AlignmentReport, WordResult, WordStatus};
