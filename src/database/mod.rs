/*!
 * Database module for persistent storage of assignments and submissions.
 *
 * This module provides SQLite-based persistence for:
 * - Reading assignments created by teachers
 * - Scored student submissions, including the words they missed
 * - Per-assignment summaries built from those submissions
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{AssignmentRecord, AssignmentSummary, MissedWordCount, SubmissionRecord};
pub use repository::Repository;
