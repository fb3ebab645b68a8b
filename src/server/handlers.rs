/*!
 * Route handlers of the HTTP API.
 */

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use log::{debug, info};
use std::sync::Arc;

use super::types::{
    AssignmentQuery, CreateAssignmentRequest, EvaluateRequest, HealthResponse, JsonBody,
    SubmissionResponse, SubmitReadingRequest, TranscribeResponse,
};
use crate::alignment::{Aligner, AlignmentReport};
use crate::coaching::{Coach, CoachFeedback, CoachingRequest};
use crate::database::{AssignmentRecord, AssignmentSummary, Repository, SubmissionRecord};
use crate::errors::AppError;
use crate::providers::{AudioClip, SpeechToText};

/// Multipart field carrying the recording
pub const AUDIO_FIELD: &str = "audio";

/// Shared state of all handlers
#[derive(Clone)]
pub struct AppState {
    pub transcriber: Arc<dyn SpeechToText>,
    pub coach: Arc<dyn Coach>,
    pub repository: Repository,
    pub aligner: Aligner,
}

impl AppState {
    pub fn new(
        transcriber: Arc<dyn SpeechToText>,
        coach: Arc<dyn Coach>,
        repository: Repository,
        aligner: Aligner,
    ) -> Self {
        Self {
            transcriber,
            coach,
            repository,
            aligner,
        }
    }
}

type ApiResult<T> = Result<T, AppError>;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/evaluate - score a transcript against a passage
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<EvaluateRequest>,
) -> Json<AlignmentReport> {
    let report = state.aligner.align(&request.target, &request.transcript);
    debug!("Evaluated {} target words: {}%", report.total(), report.accuracy);
    Json(report)
}

/// POST /api/transcribe - speech to text for an uploaded recording
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<TranscribeResponse>> {
    let clip = read_audio_field(&mut multipart).await?;
    transcribe_clip(&state, clip).await.map(Json)
}

/// Transcribe an uploaded clip, rejecting a request without one
pub async fn transcribe_clip(state: &AppState, clip: Option<AudioClip>) -> ApiResult<TranscribeResponse> {
    let clip = clip.ok_or_else(|| AppError::InvalidRequest("No audio file received".to_string()))?;

    debug!("Transcribing {} bytes of {}", clip.data.len(), clip.content_type_or_default());
    let text = state.transcriber.transcribe(clip).await?;

    Ok(TranscribeResponse { text })
}

async fn read_audio_field(multipart: &mut Multipart) -> ApiResult<Option<AudioClip>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Failed to read audio upload: {}", e)))?;

        let mut clip = AudioClip::new(data);
        clip.file_name = file_name;
        clip.content_type = content_type;
        return Ok(Some(clip));
    }

    Ok(None)
}

/// POST /api/coach - feedback for a reading, never failing
pub async fn coach(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CoachingRequest>,
) -> Json<CoachFeedback> {
    Json(state.coach.coach_or_fallback(&request).await)
}

/// POST /api/assignments
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<CreateAssignmentRequest>,
) -> ApiResult<(StatusCode, Json<AssignmentRecord>)> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidRequest("Assignment title is required".to_string()));
    }
    if request.passage.trim().is_empty() {
        return Err(AppError::InvalidRequest("Assignment passage is required".to_string()));
    }

    let assignment = AssignmentRecord::new(request.teacher_id, request.title, request.passage);
    state.repository.create_assignment(&assignment).await?;
    info!("Created assignment '{}' ({})", assignment.title, assignment.id);

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// GET /api/assignments
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssignmentQuery>,
) -> ApiResult<Json<Vec<AssignmentRecord>>> {
    let assignments = state
        .repository
        .list_assignments(query.teacher_id.as_deref())
        .await?;
    Ok(Json(assignments))
}

/// GET /api/assignments/:id
pub async fn get_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Json<AssignmentRecord>> {
    find_assignment(&state.repository, &assignment_id).await.map(Json)
}

/// DELETE /api/assignments/:id
pub async fn delete_assignment(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.repository.delete_assignment(&assignment_id).await? {
        info!("Deleted assignment {}", assignment_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(assignment_not_found(&assignment_id))
    }
}

/// POST /api/assignments/:id/submissions - score and store a reading
pub async fn submit_reading(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
    JsonBody(request): JsonBody<SubmitReadingRequest>,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    if request.student_id.trim().is_empty() {
        return Err(AppError::InvalidRequest("student_id is required".to_string()));
    }

    let assignment = find_assignment(&state.repository, &assignment_id).await?;
    let report = state.aligner.align(&assignment.passage, &request.transcript);

    let submission = SubmissionRecord::from_report(
        &assignment.id,
        request.student_id,
        request.transcript,
        &report,
    );
    state.repository.record_submission(&submission).await?;
    info!(
        "Student {} scored {}% on assignment {}",
        submission.student_id, submission.accuracy, assignment.id
    );

    Ok((StatusCode::CREATED, Json(SubmissionResponse { submission, report })))
}

/// GET /api/assignments/:id/submissions
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Json<Vec<SubmissionRecord>>> {
    find_assignment(&state.repository, &assignment_id).await?;
    let submissions = state.repository.list_submissions(&assignment_id).await?;
    Ok(Json(submissions))
}

/// GET /api/assignments/:id/summary
pub async fn assignment_summary(
    State(state): State<Arc<AppState>>,
    Path(assignment_id): Path<String>,
) -> ApiResult<Json<AssignmentSummary>> {
    find_assignment(&state.repository, &assignment_id).await?;
    let summary = state.repository.assignment_summary(&assignment_id).await?;
    Ok(Json(summary))
}

/// GET /api/students/:id/submissions
pub async fn student_submissions(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Vec<SubmissionRecord>>> {
    let submissions = state.repository.list_student_submissions(&student_id).await?;
    Ok(Json(submissions))
}

async fn find_assignment(repository: &Repository, assignment_id: &str) -> ApiResult<AssignmentRecord> {
    repository
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| assignment_not_found(assignment_id))
}

fn assignment_not_found(assignment_id: &str) -> AppError {
    AppError::NotFound(format!("Assignment {} not found", assignment_id))
}
