/*!
 * # ReadTogether - reading practice backend
 *
 * A Rust library and HTTP service that scores children's read-aloud attempts.
 *
 * ## Features
 *
 * - Word-level alignment of a speech-to-text transcript against a passage
 * - Accuracy scoring with a per-word correct/misread report
 * - Speech-to-text through the OpenAI transcription API
 * - AI coaching feedback with a fixed fallback when the model misbehaves
 * - Teacher assignments and stored student submissions (SQLite)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `alignment`: Normalization, sequence matching and scoring:
 *   - `alignment::normalize`: Text to word tokens
 *   - `alignment::matcher`: Longest-matching-block sequence matcher
 *   - `alignment::aligner`: Per-word report built from the opcodes
 *   - `alignment::report`: Report types and accuracy rounding
 * - `coaching`: Prompting and parsing of AI feedback
 * - `providers`: Client implementations for external services:
 *   - `providers::openai`: OpenAI chat and transcription client
 *   - `providers::mock`: In-process stand-ins for tests
 * - `database`: Assignment and submission persistence
 * - `server`: axum HTTP API
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod coaching;
pub mod database;
pub mod errors;
pub mod providers;
pub mod server;

// Re-export main types for easier usage
pub use alignment::{align_words, Aligner, AlignmentReport, WordResult, WordStatus};
pub use app_config::Config;
pub use coaching::{Coach, CoachFeedback, CoachingRequest, ReadingCoach};
pub use database::Repository;
pub use errors::{AppError, ProviderError};
