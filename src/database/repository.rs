/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, OptionalExtension, Row};
use std::collections::HashMap;

use super::connection::DatabaseConnection;
use super::models::{AssignmentRecord, AssignmentSummary, MissedWordCount, SubmissionRecord};
use crate::alignment::report::round_to_tenth;

/// Number of words reported in an assignment summary
const MOST_MISSED_LIMIT: usize = 10;

const ASSIGNMENT_COLUMNS: &str = "id, teacher_id, title, passage, created_at";

const SUBMISSION_COLUMNS: &str =
    "id, assignment_id, student_id, transcript, accuracy, words_missed, created_at";

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Assignment Operations
    // =========================================================================

    /// Store a new assignment
    pub async fn create_assignment(&self, assignment: &AssignmentRecord) -> Result<()> {
        let assignment = assignment.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "INSERT INTO assignments (id, teacher_id, title, passage, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        assignment.id,
                        assignment.teacher_id,
                        assignment.title,
                        assignment.passage,
                        assignment.created_at,
                    ],
                )?;
                debug!("Created assignment {}", assignment.id);
                Ok(())
            })
            .await
    }

    /// Get an assignment by ID
    pub async fn get_assignment(&self, assignment_id: &str) -> Result<Option<AssignmentRecord>> {
        let assignment_id = assignment_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        &format!("SELECT {} FROM assignments WHERE id = ?1", ASSIGNMENT_COLUMNS),
                        [assignment_id],
                        parse_assignment_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// List assignments, newest first, optionally only one teacher's
    pub async fn list_assignments(&self, teacher_id: Option<&str>) -> Result<Vec<AssignmentRecord>> {
        let teacher_id = teacher_id.map(str::to_string);

        self.db
            .execute_async(move |conn| {
                let assignments = match teacher_id {
                    Some(teacher_id) => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {} FROM assignments WHERE teacher_id = ?1 ORDER BY created_at DESC",
                            ASSIGNMENT_COLUMNS
                        ))?;
                        let rows = stmt.query_map([teacher_id], parse_assignment_row)?;
                        rows.collect::<rusqlite::Result<Vec<_>>>()?
                    }
                    None => {
                        let mut stmt = conn.prepare(&format!(
                            "SELECT {} FROM assignments ORDER BY created_at DESC",
                            ASSIGNMENT_COLUMNS
                        ))?;
                        let rows = stmt.query_map([], parse_assignment_row)?;
                        rows.collect::<rusqlite::Result<Vec<_>>>()?
                    }
                };
                Ok(assignments)
            })
            .await
    }

    /// Delete an assignment and its submissions
    ///
    /// Returns false when no such assignment existed.
    pub async fn delete_assignment(&self, assignment_id: &str) -> Result<bool> {
        let assignment_id = assignment_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM assignments WHERE id = ?1", [assignment_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    // =========================================================================
    // Submission Operations
    // =========================================================================

    /// Store a scored submission
    pub async fn record_submission(&self, submission: &SubmissionRecord) -> Result<()> {
        let submission = submission.clone();

        self.db
            .execute_async(move |conn| {
                let words_missed = serde_json::to_string(&submission.words_missed)?;
                conn.execute(
                    "INSERT INTO submissions (id, assignment_id, student_id, transcript, accuracy, words_missed, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        submission.id,
                        submission.assignment_id,
                        submission.student_id,
                        submission.transcript,
                        submission.accuracy,
                        words_missed,
                        submission.created_at,
                    ],
                )?;
                debug!(
                    "Recorded submission {} for assignment {} ({}%)",
                    submission.id, submission.assignment_id, submission.accuracy
                );
                Ok(())
            })
            .await
    }

    /// Get a submission by ID
    pub async fn get_submission(&self, submission_id: &str) -> Result<Option<SubmissionRecord>> {
        let submission_id = submission_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        &format!("SELECT {} FROM submissions WHERE id = ?1", SUBMISSION_COLUMNS),
                        [submission_id],
                        parse_submission_row,
                    )
                    .optional()?;
                Ok(result)
            })
            .await
    }

    /// Submissions for an assignment, oldest first
    pub async fn list_submissions(&self, assignment_id: &str) -> Result<Vec<SubmissionRecord>> {
        let assignment_id = assignment_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM submissions WHERE assignment_id = ?1 ORDER BY created_at ASC",
                    SUBMISSION_COLUMNS
                ))?;
                let rows = stmt.query_map([assignment_id], parse_submission_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    /// Submissions by a student across assignments, oldest first
    pub async fn list_student_submissions(&self, student_id: &str) -> Result<Vec<SubmissionRecord>> {
        let student_id = student_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM submissions WHERE student_id = ?1 ORDER BY created_at ASC",
                    SUBMISSION_COLUMNS
                ))?;
                let rows = stmt.query_map([student_id], parse_submission_row)?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    /// Aggregate scores and most-missed words for an assignment
    pub async fn assignment_summary(&self, assignment_id: &str) -> Result<AssignmentSummary> {
        let submissions = self.list_submissions(assignment_id).await?;

        let submission_count = submissions.len() as i64;
        let (average_accuracy, best_accuracy) = if submissions.is_empty() {
            (None, None)
        } else {
            let total: f64 = submissions.iter().map(|s| s.accuracy).sum();
            let best = submissions
                .iter()
                .map(|s| s.accuracy)
                .fold(f64::MIN, f64::max);
            (Some(round_to_tenth(total / submissions.len() as f64)), Some(best))
        };

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in submissions.iter().flat_map(|s| s.words_missed.iter()) {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
        let mut most_missed: Vec<MissedWordCount> = counts
            .into_iter()
            .map(|(word, count)| MissedWordCount {
                word: word.to_string(),
                count,
            })
            .collect();
        most_missed.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        most_missed.truncate(MOST_MISSED_LIMIT);

        Ok(AssignmentSummary {
            assignment_id: assignment_id.to_string(),
            submission_count,
            average_accuracy,
            best_accuracy,
            most_missed,
        })
    }
}

fn parse_assignment_row(row: &Row) -> rusqlite::Result<AssignmentRecord> {
    Ok(AssignmentRecord {
        id: row.get(0)?,
        teacher_id: row.get(1)?,
        title: row.get(2)?,
        passage: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn parse_submission_row(row: &Row) -> rusqlite::Result<SubmissionRecord> {
    let words_missed: String = row.get(5)?;
    let words_missed = serde_json::from_str(&words_missed).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(SubmissionRecord {
        id: row.get(0)?,
        assignment_id: row.get(1)?,
        student_id: row.get(2)?,
        transcript: row.get(3)?,
        accuracy: row.get(4)?,
        words_missed,
        created_at: row.get(6)?,
    })
}
