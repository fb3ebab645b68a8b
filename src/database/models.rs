/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};

use crate::alignment::AlignmentReport;

/// Reading assignment written by a teacher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Unique assignment identifier (UUID)
    pub id: String,
    /// Teacher who owns the assignment
    pub teacher_id: String,
    /// Short title shown to students
    pub title: String,
    /// Passage the student reads aloud
    pub passage: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl AssignmentRecord {
    /// Create a new assignment with a fresh id and timestamp
    pub fn new(
        teacher_id: impl Into<String>,
        title: impl Into<String>,
        passage: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            teacher_id: teacher_id.into(),
            title: title.into(),
            passage: passage.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A student's scored reading of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Unique submission identifier (UUID)
    pub id: String,
    /// Assignment that was read
    pub assignment_id: String,
    /// Student who read it
    pub student_id: String,
    /// Transcript the score was computed from
    pub transcript: String,
    /// Accuracy percentage from the alignment report
    pub accuracy: f64,
    /// Misread target words, in passage order
    pub words_missed: Vec<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl SubmissionRecord {
    /// Create a submission from an alignment report
    pub fn from_report(
        assignment_id: impl Into<String>,
        student_id: impl Into<String>,
        transcript: impl Into<String>,
        report: &AlignmentReport,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            assignment_id: assignment_id.into(),
            student_id: student_id.into(),
            transcript: transcript.into(),
            accuracy: report.accuracy,
            words_missed: report.misread_words(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// How often a word was missed across submissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissedWordCount {
    pub word: String,
    pub count: usize,
}

/// Aggregate results for one assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub assignment_id: String,
    /// Number of submissions
    pub submission_count: i64,
    /// Mean accuracy, `None` without submissions
    pub average_accuracy: Option<f64>,
    /// Best accuracy, `None` without submissions
    pub best_accuracy: Option<f64>,
    /// Most frequently missed words, most frequent first
    pub most_missed: Vec<MissedWordCount>,
}
